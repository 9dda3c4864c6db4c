use serde::{Deserialize, Serialize};

pub const OTP_LENGTH: usize = 6;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub last_message: String,
    /// Display label such as "2 min ago"; not sortable.
    pub last_activity: String,
}

impl Conversation {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        last_message: impl Into<String>,
        last_activity: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            last_message: last_message.into(),
            last_activity: last_activity.into(),
        }
    }

    /// `needle` must already be lowercase.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.last_message.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneCredential {
    calling_code: String,
    national_number: String,
}

impl PhoneCredential {
    pub fn new(calling_code: impl Into<String>) -> Self {
        Self {
            calling_code: calling_code.into(),
            national_number: String::new(),
        }
    }

    pub fn calling_code(&self) -> &str {
        &self.calling_code
    }

    pub fn national_number(&self) -> &str {
        &self.national_number
    }

    pub(crate) fn set_calling_code(&mut self, code: &str) {
        self.calling_code = code.trim().to_string();
    }

    pub(crate) fn set_national_number(&mut self, raw: &str) {
        self.national_number = crate::utils::digits_only(raw);
    }

    /// "+1 5551234567", as shown on the OTP screen.
    pub fn display(&self) -> String {
        format!("{} {}", self.calling_code, self.national_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OtpCode(String);

impl OtpCode {
    pub(crate) fn set(&mut self, raw: &str) {
        self.0 = crate::utils::digits_only(raw);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == OTP_LENGTH && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

/// A dialing code that survived validation at the data-source boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryOption {
    pub display_name: String,
    pub calling_code: String,
    pub iso_code: Option<String>,
    pub flag_url: Option<String>,
}

// Shape of the restcountries payload. Everything is optional because the
// source omits fields freely; see `api::client::parse_countries`.
#[derive(Debug, Deserialize, Default)]
pub struct RawCountry {
    pub name: Option<RawCountryName>,
    pub idd: Option<RawIdd>,
    pub cca2: Option<String>,
    pub flags: Option<RawFlags>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawCountryName {
    pub common: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawIdd {
    pub root: Option<String>,
    pub suffixes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawFlags {
    pub svg: Option<String>,
}

impl RawCountry {
    pub fn into_option(self) -> Option<CountryOption> {
        let display_name = self
            .name
            .and_then(|n| n.common)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())?;
        let idd = self.idd?;
        let root = idd.root.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())?;
        let calling_code = match idd.suffixes.as_deref() {
            Some([only]) => format!("{root}{}", only.trim()),
            _ => root,
        };
        Some(CountryOption {
            display_name,
            calling_code,
            iso_code: self.cca2,
            flag_url: self.flags.and_then(|f| f.svg),
        })
    }
}
