//! Payload construction.
//!
//! Maps a content [`Category`] and its free-text fields to the canonical string
//! that gets encoded into the QR symbol. Templates are fixed per category so
//! that scanners recognise the result (vCard, vEvent, `WIFI:`, `SMSTO:`, ...).
//!
//! # Example
//!
//! ```rust
//! use qrstudio::payload::{build_payload, Category, ContentRequest};
//!
//! let request = ContentRequest::new(Category::Wifi)
//!     .with_field("ssid", "Home")
//!     .with_field("password", "secret")
//!     .with_field("encryption", "WPA");
//!
//! assert_eq!(build_payload(&request).unwrap(), "WIFI:S:Home;T:WPA;P:secret;;");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use uuid::Uuid;

use crate::error::{QrError, Result};

/// Base URL used for dynamic content when no other is configured.
pub const DEFAULT_DYNAMIC_BASE_URL: &str = "https://qr.example.com/d";

// RFC 3986 unreserved characters stay literal, everything else is escaped.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The kind of content a QR code carries.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Category {
    Url,
    VCard,
    Email,
    Geo,
    Event,
    Text,
    Wifi,
    Sms,
    PaymentLink,
    Dynamic,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Url,
        Category::VCard,
        Category::Email,
        Category::Geo,
        Category::Event,
        Category::Text,
        Category::Wifi,
        Category::Sms,
        Category::PaymentLink,
        Category::Dynamic,
    ];

    /// Stable identifier used in forms.
    pub fn slug(self) -> &'static str {
        use Category::*;
        match self {
            Url => "url",
            VCard => "vcard",
            Email => "email",
            Geo => "geo",
            Event => "event",
            Text => "text",
            Wifi => "wifi",
            Sms => "sms",
            PaymentLink => "payment",
            Dynamic => "dynamic",
        }
    }

    pub fn label(self) -> &'static str {
        use Category::*;
        match self {
            Url => "URL",
            VCard => "Contact Information (vCard)",
            Email => "Email",
            Geo => "Geo Location",
            Event => "Event (vCalendar)",
            Text => "Text",
            Wifi => "Wi-Fi",
            Sms => "SMS",
            PaymentLink => "Payment Link",
            Dynamic => "Dynamic Content",
        }
    }

    /// Fields that must be non-empty before a payload can be built.
    pub fn required_fields(self) -> &'static [&'static str] {
        use Category::*;
        match self {
            Url | PaymentLink => &["url"],
            Text => &["text"],
            VCard => &["name"],
            Email => &["email"],
            Geo => &["latitude", "longitude"],
            Event => &["name", "start", "end"],
            Wifi => &["ssid"],
            Sms => &["phone"],
            Dynamic => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QrError::validation(format!("Unknown content type '{}'", s)))
    }
}

/// Wi-Fi authentication types accepted by scanners.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum WifiEncryption {
    #[default]
    Wpa,
    Wep,
    None,
}

impl WifiEncryption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::None => "None",
        }
    }
}

impl FromStr for WifiEncryption {
    type Err = QrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "WPA" => Ok(Self::Wpa),
            "WEP" => Ok(Self::Wep),
            "NONE" => Ok(Self::None),
            other => Err(QrError::validation(format!(
                "Unsupported Wi-Fi encryption '{}', expected WPA, WEP or None",
                other
            ))),
        }
    }
}

/// A category plus the raw form fields collected for it.
#[derive(Clone, Debug)]
pub struct ContentRequest {
    pub category: Category,
    pub fields: BTreeMap<String, String>,
    dynamic_base_url: Option<String>,
}

impl ContentRequest {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            fields: BTreeMap::new(),
            dynamic_base_url: None,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Overrides the base URL used for [`Category::Dynamic`].
    pub fn with_dynamic_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.dynamic_base_url = Some(base_url.into());
        self
    }

    /// Returns the field value, or `""` when absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    fn check_required(&self) -> Result<()> {
        for name in self.category.required_fields() {
            if self.field(name).trim().is_empty() {
                return Err(QrError::validation(format!(
                    "{}: field '{}' is required",
                    self.category.label(),
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Builds the payload string for the request's category.
///
/// # Errors
///
/// Returns [`QrError::Validation`] when a required field is empty or a
/// structured value (coordinates, Wi-Fi encryption) does not parse.
pub fn build_payload(request: &ContentRequest) -> Result<String> {
    request.check_required()?;
    let f = |name| request.field(name);

    use Category::*;
    let payload = match request.category {
        Url | PaymentLink => f("url").to_string(),
        Text => f("text").to_string(),
        VCard => format!(
            "BEGIN:VCARD\nVERSION:3.0\nFN:{}\nEMAIL:{}\nTEL:{}\nADR:{}\nORG:{}\nEND:VCARD",
            f("name"),
            f("email"),
            f("phone"),
            f("address"),
            f("company")
        ),
        Email => format!(
            "mailto:{}?subject={}&body={}",
            f("email"),
            utf8_percent_encode(f("subject"), QUERY_VALUE),
            utf8_percent_encode(f("body"), QUERY_VALUE)
        ),
        Geo => {
            let latitude = parse_coordinate("latitude", f("latitude"), 90.0)?;
            let longitude = parse_coordinate("longitude", f("longitude"), 180.0)?;
            format!("geo:{},{}", latitude, longitude)
        }
        Event => format!(
            "BEGIN:VEVENT\nSUMMARY:{}\nDTSTART:{}\nDTEND:{}\nLOCATION:{}\nEND:VEVENT",
            f("name"),
            f("start"),
            f("end"),
            f("location")
        ),
        Wifi => {
            let encryption: WifiEncryption = f("encryption").parse()?;
            format!(
                "WIFI:S:{};T:{};P:{};;",
                f("ssid"),
                encryption.as_str(),
                f("password")
            )
        }
        Sms => format!("SMSTO:{}:{}", f("phone"), f("message")),
        Dynamic => {
            let base = request
                .dynamic_base_url
                .as_deref()
                .unwrap_or(DEFAULT_DYNAMIC_BASE_URL);
            format!("{}/{}", base.trim_end_matches('/'), Uuid::new_v4().simple())
        }
    };

    tracing::debug!(category = %request.category, len = payload.len(), "payload built");
    Ok(payload)
}

// Validates the coordinate and returns the caller's text unchanged.
fn parse_coordinate<'a>(name: &str, raw: &'a str, limit: f64) -> Result<&'a str> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| QrError::validation(format!("{} must be a number, got '{}'", name, raw)))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(QrError::validation(format!(
            "{} must be between -{} and {}",
            name, limit, limit
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wifi_template() {
        let req = ContentRequest::new(Category::Wifi)
            .with_field("ssid", "Home")
            .with_field("password", "secret")
            .with_field("encryption", "WPA");
        assert_eq!(build_payload(&req).unwrap(), "WIFI:S:Home;T:WPA;P:secret;;");
    }

    #[test]
    fn test_wifi_defaults_to_wpa_and_rejects_unknown() {
        let req = ContentRequest::new(Category::Wifi).with_field("ssid", "Cafe");
        assert_eq!(build_payload(&req).unwrap(), "WIFI:S:Cafe;T:WPA;P:;;");

        let req = req.with_field("encryption", "WPA3-SAE");
        assert!(matches!(build_payload(&req), Err(QrError::Validation(_))));
    }

    #[test]
    fn test_raw_categories_pass_input_through() {
        let url = ContentRequest::new(Category::Url).with_field("url", "https://example.com/a?b=c");
        assert_eq!(build_payload(&url).unwrap(), "https://example.com/a?b=c");

        let pay = ContentRequest::new(Category::PaymentLink).with_field("url", "https://pay.me/x");
        assert_eq!(build_payload(&pay).unwrap(), "https://pay.me/x");

        let text = ContentRequest::new(Category::Text).with_field("text", "  two\nlines ");
        assert_eq!(build_payload(&text).unwrap(), "  two\nlines ");
    }

    #[test]
    fn test_vcard_template() {
        let req = ContentRequest::new(Category::VCard)
            .with_field("name", "Ada Lovelace")
            .with_field("email", "ada@example.com")
            .with_field("phone", "+44 20 0000")
            .with_field("address", "London")
            .with_field("company", "Analytical Engines");
        assert_eq!(
            build_payload(&req).unwrap(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Ada Lovelace\nEMAIL:ada@example.com\nTEL:+44 20 0000\nADR:London\nORG:Analytical Engines\nEND:VCARD"
        );
    }

    #[test]
    fn test_vcard_missing_optional_fields_are_empty() {
        let req = ContentRequest::new(Category::VCard).with_field("name", "Bob");
        assert_eq!(
            build_payload(&req).unwrap(),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Bob\nEMAIL:\nTEL:\nADR:\nORG:\nEND:VCARD"
        );
    }

    #[test]
    fn test_email_escapes_subject_and_body() {
        let req = ContentRequest::new(Category::Email)
            .with_field("email", "team@example.com")
            .with_field("subject", "Q&A")
            .with_field("body", "a=b c");
        assert_eq!(
            build_payload(&req).unwrap(),
            "mailto:team@example.com?subject=Q%26A&body=a%3Db%20c"
        );
    }

    #[test]
    fn test_geo_template_and_validation() {
        let req = ContentRequest::new(Category::Geo)
            .with_field("latitude", "52.52")
            .with_field("longitude", "13.405");
        assert_eq!(build_payload(&req).unwrap(), "geo:52.52,13.405");

        let bad = ContentRequest::new(Category::Geo)
            .with_field("latitude", "north")
            .with_field("longitude", "13.405");
        assert!(matches!(build_payload(&bad), Err(QrError::Validation(_))));

        let out_of_range = ContentRequest::new(Category::Geo)
            .with_field("latitude", "91")
            .with_field("longitude", "0");
        assert!(matches!(build_payload(&out_of_range), Err(QrError::Validation(_))));
    }

    #[test]
    fn test_event_template() {
        let req = ContentRequest::new(Category::Event)
            .with_field("name", "Launch")
            .with_field("start", "2026-10-16")
            .with_field("end", "2026-10-17")
            .with_field("location", "Berlin");
        assert_eq!(
            build_payload(&req).unwrap(),
            "BEGIN:VEVENT\nSUMMARY:Launch\nDTSTART:2026-10-16\nDTEND:2026-10-17\nLOCATION:Berlin\nEND:VEVENT"
        );
    }

    #[test]
    fn test_sms_template() {
        let req = ContentRequest::new(Category::Sms)
            .with_field("phone", "+15551234")
            .with_field("message", "hi there");
        assert_eq!(build_payload(&req).unwrap(), "SMSTO:+15551234:hi there");
    }

    #[test]
    fn test_dynamic_uses_base_url_and_fresh_id() {
        let req = ContentRequest::new(Category::Dynamic).with_dynamic_base_url("https://s.test/q/");
        let a = build_payload(&req).unwrap();
        let b = build_payload(&req).unwrap();
        assert!(a.starts_with("https://s.test/q/"));
        assert_eq!(a.len(), "https://s.test/q/".len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_blank_required_field_is_rejected() {
        for category in Category::ALL {
            if category.required_fields().is_empty() {
                continue;
            }
            let mut req = ContentRequest::new(category);
            for name in category.required_fields() {
                req = req.with_field(*name, "   ");
            }
            assert!(
                matches!(build_payload(&req), Err(QrError::Validation(_))),
                "{} accepted blank fields",
                category
            );
        }
    }

    #[test]
    fn test_category_round_trips_through_slug() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>().unwrap(), category);
        }
        assert!("barcode".parse::<Category>().is_err());
    }
}
