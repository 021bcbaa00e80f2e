// Cache generation. Bumping this string on deploy is the only upgrade
// mechanism: stale generations are dropped on activation by name inequality.
pub const CACHE_NAME: &str = "ipstream-cache-v1";

pub const OFFLINE_URL: &str = "/offline.html";

// Seed set pre-cached at install time. All of them must fetch with a 2xx or
// the install is discarded.
pub const SEED_MANIFEST: [&str; 4] = [
    OFFLINE_URL,
    "/manifest.json",
    "/assets/js/config.js",
    "/config/config.json",
];

pub const RUNTIME_CONFIG_PATH: &str = "/config/config.json";

pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

// Platform connection timeouts can leave a fetch pending for minutes. Treat
// anything slower than this as a network failure and fall back to cache.
pub const DEFAULT_FETCH_TIMEOUT: &str = "10s";

pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

pub const NOTIFICATION_TITLE: &str = "IPStream Radio";
pub const NOTIFICATION_DEFAULT_BODY: &str = "Nueva actualización disponible";
pub const NOTIFICATION_ICON: &str = "/assets/icons/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/assets/icons/icon-72x72.png";
pub const NOTIFICATION_VIBRATE: [u32; 3] = [100, 50, 100];
pub const NOTIFICATION_ACTION_EXPLORE: &str = "explore";
pub const NOTIFICATION_ACTION_CLOSE: &str = "close";

pub const OFFLINE_BODY: &str = "Offline";

// Dashboard API pagination defaults.
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

pub const SONICPANEL_INFO_URL: &str = "https://stream.ipstream.cl/cp/get_info.php";
pub const SONICPANEL_DEFAULT_PORT: &str = "8018";
