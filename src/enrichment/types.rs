use serde::{Deserialize, Serialize, Serializer};

use super::coerce;

/// Enrichment profile of one company domain, as returned by the upstream
/// provider.
///
/// All fields except `domain` are optional; deserialization goes through the
/// lenient readers in [`coerce`](super::coerce) so a malformed field is read
/// as absent instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(from = "RawRecord")]
pub struct EnrichmentRecord {
    pub organization: Option<String>,
    pub domain: String,
    pub industry: Option<String>,
    pub employees_count: Option<u64>,
    pub emails_count: Option<u64>,
    pub webmail: Option<bool>,
    pub emails: Vec<EmailEntry>,
}

/// Wire shape. Headcount arrives as `employees_count`, `employees`, or both.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default, deserialize_with = "coerce::string")]
    organization: Option<String>,

    #[serde(default, deserialize_with = "coerce::required_string")]
    domain: String,

    #[serde(default, deserialize_with = "coerce::string")]
    industry: Option<String>,

    #[serde(default, deserialize_with = "coerce::count")]
    employees_count: Option<u64>,

    #[serde(default, deserialize_with = "coerce::count")]
    employees: Option<u64>,

    #[serde(default, deserialize_with = "coerce::count")]
    emails_count: Option<u64>,

    #[serde(default, deserialize_with = "coerce::flag")]
    webmail: Option<bool>,

    #[serde(default, deserialize_with = "coerce::emails")]
    emails: Vec<EmailEntry>,
}

impl From<RawRecord> for EnrichmentRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            organization: raw.organization,
            domain: raw.domain,
            industry: raw.industry,
            employees_count: raw.employees_count.or(raw.employees),
            emails_count: raw.emails_count,
            webmail: raw.webmail,
            emails: raw.emails,
        }
    }
}

impl EnrichmentRecord {
    /// Empty record for `domain`
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Organization name, falling back to the domain
    pub fn display_name(&self) -> &str {
        self.organization.as_deref().unwrap_or(&self.domain)
    }
}

/// One discovered email address. The address itself is not kept; scoring
/// only looks at its metadata.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EmailEntry {
    #[serde(rename = "type", default, deserialize_with = "coerce::email_kind")]
    pub kind: EmailKind,

    #[serde(default, deserialize_with = "coerce::confidence")]
    pub confidence: Option<f64>,

    #[serde(default, deserialize_with = "coerce::string")]
    pub position: Option<String>,
}

impl EmailEntry {
    pub fn new(kind: EmailKind, confidence: Option<f64>, position: Option<&str>) -> Self {
        Self {
            kind,
            confidence,
            position: position.map(str::to_string),
        }
    }
}

/// Email category. The provider's set is open; unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EmailKind {
    Generic,
    Personal,
    #[default]
    Unknown,
    Other(String),
}

impl EmailKind {
    pub fn as_str(&self) -> &str {
        match self {
            EmailKind::Generic => "generic",
            EmailKind::Personal => "personal",
            EmailKind::Unknown => "",
            EmailKind::Other(s) => s,
        }
    }
}

impl From<&str> for EmailKind {
    fn from(s: &str) -> Self {
        match s {
            "generic" => EmailKind::Generic,
            "personal" => EmailKind::Personal,
            "" => EmailKind::Unknown,
            other => EmailKind::Other(other.to_string()),
        }
    }
}

impl Serialize for EmailKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let value = json!({
            "organization": "Stripe",
            "domain": "stripe.com",
            "industry": "Technology",
            "employees_count": 500,
            "emails_count": 2,
            "webmail": false,
            "emails": [
                { "value": "ops@stripe.com", "type": "generic", "confidence": 95, "position": "CTO" }
            ]
        });

        let record: EnrichmentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.organization.as_deref(), Some("Stripe"));
        assert_eq!(record.domain, "stripe.com");
        assert_eq!(record.employees_count, Some(500));
        assert_eq!(record.emails_count, Some(2));
        assert_eq!(record.webmail, Some(false));
        assert_eq!(record.emails.len(), 1);
        assert_eq!(record.emails[0].kind, EmailKind::Generic);
        assert_eq!(record.emails[0].confidence, Some(95.0));
        assert_eq!(record.emails[0].position.as_deref(), Some("CTO"));
    }

    #[test]
    fn test_empty_object_is_all_absent() {
        let record: EnrichmentRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(record, EnrichmentRecord::default());
    }

    #[test]
    fn test_malformed_fields_read_as_absent() {
        let value = json!({
            "domain": "acme.io",
            "industry": 42,
            "employees_count": -3,
            "emails_count": "lots",
            "webmail": "maybe",
            "emails": [
                "not-an-object",
                { "type": "personal", "confidence": 250, "position": ["ceo"] },
                { "confidence": "90" }
            ]
        });

        let record: EnrichmentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.industry, None);
        assert_eq!(record.employees_count, None);
        assert_eq!(record.emails_count, None);
        assert_eq!(record.webmail, None);
        assert_eq!(record.emails.len(), 2);
        assert_eq!(record.emails[0].kind, EmailKind::Personal);
        assert_eq!(record.emails[0].confidence, None);
        assert_eq!(record.emails[0].position, None);
        assert_eq!(record.emails[1].kind, EmailKind::Unknown);
        assert_eq!(record.emails[1].confidence, Some(90.0));
    }

    #[test]
    fn test_padded_industry_and_position_do_not_match() {
        let record: EnrichmentRecord = serde_json::from_value(json!({
            "domain": "a.io",
            "industry": " saas ",
            "emails": [{ "type": "personal", "position": "ceo " }]
        }))
        .unwrap();
        assert_eq!(record.industry.as_deref(), Some(" saas "));
        assert_eq!(crate::scoring::score(&record).score, 0);
    }

    #[test]
    fn test_emails_not_an_array() {
        let record: EnrichmentRecord =
            serde_json::from_value(json!({ "domain": "a.io", "emails": { "type": "generic" } }))
                .unwrap();
        assert!(record.emails.is_empty());
    }

    #[test]
    fn test_employees_alias() {
        let record: EnrichmentRecord =
            serde_json::from_value(json!({ "domain": "a.io", "employees": 25 })).unwrap();
        assert_eq!(record.employees_count, Some(25));
    }

    #[test]
    fn test_both_headcount_keys_prefer_employees_count() {
        let record: EnrichmentRecord = serde_json::from_value(json!({
            "domain": "x.io",
            "industry": "SaaS",
            "employees": 50,
            "employees_count": 60
        }))
        .unwrap();
        assert_eq!(record.employees_count, Some(60));
        assert_eq!(crate::scoring::score(&record).score, 30);

        // Malformed employees_count falls back to employees
        let record: EnrichmentRecord = serde_json::from_value(json!({
            "employees": 50,
            "employees_count": "lots"
        }))
        .unwrap();
        assert_eq!(record.employees_count, Some(50));
    }

    #[test]
    fn test_webmail_numeric_truthiness() {
        let record: EnrichmentRecord =
            serde_json::from_value(json!({ "webmail": 1 })).unwrap();
        assert_eq!(record.webmail, Some(true));
        let record: EnrichmentRecord =
            serde_json::from_value(json!({ "webmail": 0 })).unwrap();
        assert_eq!(record.webmail, Some(false));
    }

    #[test]
    fn test_unknown_email_kind_kept() {
        let entry: EmailEntry = serde_json::from_value(json!({ "type": "role" })).unwrap();
        assert_eq!(entry.kind, EmailKind::Other("role".to_string()));
    }

    #[test]
    fn test_display_name_falls_back_to_domain() {
        let record = EnrichmentRecord::for_domain("acme.io");
        assert_eq!(record.display_name(), "acme.io");
    }

    #[test]
    fn test_serde_roundtrip_for_cache() {
        let record = EnrichmentRecord {
            organization: Some("Acme".to_string()),
            domain: "acme.io".to_string(),
            industry: Some("SaaS".to_string()),
            employees_count: Some(12),
            emails_count: Some(1),
            webmail: Some(true),
            emails: vec![EmailEntry::new(EmailKind::Personal, Some(81.0), Some("Founder"))],
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: EnrichmentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
