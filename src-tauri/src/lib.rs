// Import backend module for real data integration
pub mod backend;

use backend::{initialize_backend, AppState};
use backend::domain::Network;
use log::{error, info};
use shared::{SessionSnapshot, WalletSyncRequest};

/// Run one wallet sync and return the resulting session snapshot.
///
/// The webview passes the viewing key and network selection from the login
/// screen; when no start block is given, the per-network default is used.
#[tauri::command]
async fn sync_wallet(
    app_state: tauri::State<'_, AppState>,
    viewing_key: String,
    is_testnet: bool,
    birthday: Option<u32>,
) -> Result<SessionSnapshot, String> {
    let network = Network::from_flag(is_testnet);
    let birthday = birthday.unwrap_or_else(|| network.default_birthday());
    info!(
        "🔄 Sync requested ({:?}, from block {})",
        network, birthday
    );

    let request = WalletSyncRequest {
        viewing_key,
        is_testnet,
        birthday,
    };
    match app_state.sync_service.sync(request).await {
        Ok(snapshot) => {
            info!("✅ Sync finished");
            Ok(snapshot)
        }
        Err(e) => {
            error!("❌ Sync failed: {}", e);
            Err(e.to_string())
        }
    }
}

/// Leave the dashboard and return to the login screen.
#[tauri::command]
fn exit_wallet(app_state: tauri::State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(app_state.sync_service.exit())
}

/// Expand or collapse one transaction row.
#[tauri::command]
fn toggle_transaction_details(
    app_state: tauri::State<'_, AppState>,
    txid: String,
) -> Result<SessionSnapshot, String> {
    Ok(app_state.sync_service.toggle_details(&txid))
}

/// Current session state, for webview startup and refreshes.
#[tauri::command]
fn get_session(app_state: tauri::State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(app_state.sync_service.snapshot())
}

/// Default start block for the selected network, shown on the login screen.
#[tauri::command]
fn default_birthday(is_testnet: bool) -> u32 {
    Network::from_flag(is_testnet).default_birthday()
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let app_state = initialize_backend().expect("Failed to initialize backend");

    tauri::Builder::default()
        .plugin(
            tauri_plugin_log::Builder::new()
                .targets([
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("zcash-viewer.log".to_string()),
                    }),
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Stdout),
                    tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Webview),
                ])
                .level(log::LevelFilter::Info)
                .build(),
        )
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            sync_wallet,
            exit_wallet,
            toggle_transaction_details,
            get_session,
            default_birthday,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
