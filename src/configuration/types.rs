use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub url: Option<String>,
}

/// External identity-control command and its timing.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub program: String,
    pub list_args: Vec<String>,
    pub connect_args: Vec<String>,
    pub disconnect_args: Vec<String>,
    pub status_args: Vec<String>,
    pub list_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub disconnect_timeout_secs: u64,
    pub pre_connect_delay_secs: u64,
    pub stabilization_secs: u64,
    pub post_disconnect_delay_secs: u64,
    pub verify_status: bool,
    pub excluded_tokens: Vec<String>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            program: String::from("nordvpn"),
            list_args: vec![String::from("countries")],
            connect_args: vec![String::from("connect")],
            disconnect_args: vec![String::from("disconnect")],
            status_args: vec![String::from("status")],
            list_timeout_secs: 30,
            connect_timeout_secs: 90,
            disconnect_timeout_secs: 30,
            pre_connect_delay_secs: 3,
            stabilization_secs: 15,
            post_disconnect_delay_secs: 5,
            verify_status: true,
            excluded_tokens: vec![
                String::from("available"),
                String::from("countries"),
                String::from("nordvpn"),
            ],
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EgressConfig {
    pub endpoints: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for EgressConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                String::from("https://ipinfo.io/ip"),
                String::from("https://api.ipify.org"),
                String::from("https://checkip.amazonaws.com"),
            ],
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub root_dir: String,
    pub dir_prefix: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_executable: Option<String>,
    pub user_agent: Option<String>,
    pub page_load_timeout_secs: u64,
    pub launch_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root_dir: String::from("temp_chrome_sessions"),
            dir_prefix: String::from("hotel_chrome_session"),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            chrome_executable: None,
            user_agent: None,
            page_load_timeout_secs: 60,
            launch_timeout_secs: 30,
        }
    }
}

/// Ordered selector lists per field.
///
/// Order matters: the first selector is the most stable markup observed on the
/// target site, later entries cover older or alternate layouts.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub hotel_name: Vec<String>,
    pub address: Vec<String>,
    pub rating: Vec<String>,
    pub price: Vec<String>,
    pub checkin: Vec<String>,
    pub checkout: Vec<String>,
    pub nights: Vec<String>,
    pub popup_selectors: Vec<String>,
    pub pricing_section_selectors: Vec<String>,
    pub popup_timeout_secs: u64,
    pub body_timeout_secs: u64,
    pub settle_secs: u64,
    pub post_load_settle_secs: u64,
}

fn owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            hotel_name: owned(&[
                "h2[data-testid='header-title']",
                ".pp-header__title",
                "h1[data-testid='title']",
                "h1.hp__hotel-name",
            ]),
            address: owned(&["[data-testid='address']"]),
            rating: owned(&["[data-testid='review-score-component'] .ac78a73c96"]),
            price: owned(&[
                "[data-testid='price-and-discounted-price'] .prco-valign-middle-helper",
                ".prco-valign-middle-helper",
                ".bui-price-display__value",
                ".sr-card__price--urgency .bui-price-display__value",
                ".bui-price-display__original",
                "[data-testid='price-and-discounted-price']",
                ".bui-price-display__label",
                ".prco-text-nowrap-helper",
            ]),
            checkin: owned(&["[data-testid='date-display-field-start']"]),
            checkout: owned(&["[data-testid='date-display-field-end']"]),
            nights: owned(&["[data-testid='price-summary'] .bp-price-summary__duration"]),
            popup_selectors: owned(&[
                "[data-testid='header-banner-close-button']",
                ".bui-modal__close",
                ".bui-button--close",
                "[aria-label='Close']",
                ".close-button",
                ".modal-close",
            ]),
            pricing_section_selectors: owned(&[
                "[data-testid='availability-calendar-date-picker']",
                ".hprt-table",
                ".hp_rt_rooms_table",
                ".availability",
                "[data-testid='property-section-prices']",
                ".bui-price-display",
                ".hprt-occupancy-occupancy-info",
            ]),
            popup_timeout_secs: 3,
            body_timeout_secs: 30,
            settle_secs: 8,
            post_load_settle_secs: 5,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub inter_identity_delay_secs: u64,
    pub max_identities: Option<usize>,
    /// Restricts the run to these identities, in this order.
    pub identities: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            inter_identity_delay_secs: 10,
            max_identities: None,
            identities: Vec::new(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
    pub screenshots_dir: String,
    pub file_prefix: String,
    pub full_page_screenshot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: String::from("hotel_prices"),
            screenshots_dir: String::from("screenshots"),
            file_prefix: String::from("hotel_multi_country"),
            full_page_screenshot: false,
        }
    }
}
