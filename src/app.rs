use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::client::{CountryClient, DEFAULT_COUNTRIES_URL};
use crate::api::events::Toast;
use crate::api::models::CountryOption;
use crate::auth::{AuthFlow, SubmitDelays};
use crate::conversations::ConversationList;
use crate::error::ConfigError;
use crate::ui::login::LoginOutcome;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub default_calling_code: String,
    pub countries_url: String,
    pub send_delay_ms: u64,
    pub verify_delay_ms: u64,
    pub seed_samples: bool,
    pub fetch_countries: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_calling_code: "+1".to_string(),
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            send_delay_ms: 1500,
            verify_delay_ms: 1500,
            seed_samples: true,
            fetch_countries: true,
        }
    }
}

impl Settings {
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("gemini-chat.toml"))
    }

    /// Settings from the user config dir, or defaults when there is no
    /// readable file.
    pub fn load() -> Self {
        match Self::toml_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str::<Settings>(&text) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("ignoring unreadable {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::toml_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn submit_delays(&self) -> SubmitDelays {
        SubmitDelays {
            send_otp: Duration::from_millis(self.send_delay_ms),
            verify_otp: Duration::from_millis(self.verify_delay_ms),
        }
    }
}

/// Sign-in screen first, then the dashboard once authenticated.
pub fn run<R: BufRead, W: Write>(settings: &Settings, input: &mut R, out: &mut W) -> io::Result<()> {
    let countries = load_countries(settings, out)?;
    let mut flow = AuthFlow::new(&settings.default_calling_code, settings.submit_delays());
    if crate::ui::login::show_login(&mut flow, &countries, input, out)? == LoginOutcome::Quit {
        return Ok(());
    }
    drop(flow);

    let list = if settings.seed_samples {
        ConversationList::with_samples()
    } else {
        ConversationList::default()
    };
    crate::ui::main_window::show_main_window(list, input, out)
}

// A failed fetch only costs the selector its entries; the default code keeps
// working.
fn load_countries<W: Write>(settings: &Settings, out: &mut W) -> io::Result<Vec<CountryOption>> {
    if !settings.fetch_countries {
        return Ok(Vec::new());
    }
    let url = settings.countries_url.clone();
    let rx = crate::utils::run_async_to_main(async move {
        match CountryClient::new(&url) {
            Ok(client) => client.countries().await,
            Err(e) => Err(e),
        }
    });
    match rx.blocking_recv() {
        Ok(Ok(countries)) => Ok(countries),
        Ok(Err(e)) => {
            log::warn!("country list unavailable: {e}");
            crate::ui::print_toast(out, &Toast::error("Failed to load countries"))?;
            Ok(Vec::new())
        }
        Err(_) => {
            crate::ui::print_toast(out, &Toast::error("Failed to load countries"))?;
            Ok(Vec::new())
        }
    }
}
