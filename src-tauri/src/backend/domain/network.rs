//! Network selection and per-network policy constants.

/// Default scan start heights shown on the login screen and used when a sync
/// request does not override the birthday. Mainnet's default is lower because
/// its chain history is longer. Policy constants, not derived values.
pub const DEFAULT_BIRTHDAY_TESTNET: u32 = 3_700_000;
pub const DEFAULT_BIRTHDAY_MAINNET: u32 = 2_000_000;

/// Which chain the sync service should scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// The webview passes network selection as a testnet flag.
    pub fn from_flag(is_testnet: bool) -> Self {
        if is_testnet {
            Network::Testnet
        } else {
            Network::Mainnet
        }
    }

    pub fn default_birthday(self) -> u32 {
        match self {
            Network::Testnet => DEFAULT_BIRTHDAY_TESTNET,
            Network::Mainnet => DEFAULT_BIRTHDAY_MAINNET,
        }
    }
}
