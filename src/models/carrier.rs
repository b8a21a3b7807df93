/// Email-to-SMS gateway domains for supported US carriers.
/// `{10-digit phone}@{gateway}` delivered as email arrives as a text message.
pub const CARRIER_GATEWAYS: &[(&str, &str)] = &[
    ("att", "txt.att.net"),
    ("verizon", "vtext.com"),
    ("tmobile", "tmomail.net"),
    ("sprint", "messaging.sprintpcs.com"),
    ("uscellular", "email.uscc.net"),
    ("cricket", "sms.cricketwireless.net"),
    ("boost", "sms.myboostmobile.com"),
    ("metropcs", "mymetropcs.com"),
];

/// Case-insensitive gateway lookup.
pub fn gateway(carrier: &str) -> Option<&'static str> {
    let carrier = carrier.to_lowercase();
    CARRIER_GATEWAYS
        .iter()
        .find(|(key, _)| *key == carrier)
        .map(|(_, domain)| *domain)
}

/// Comma-separated list of supported carrier keys, for validation errors.
pub fn supported_carriers() -> String {
    CARRIER_GATEWAYS
        .iter()
        .map(|(key, _)| *key)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_carriers_resolve() {
        assert_eq!(gateway("verizon"), Some("vtext.com"));
        assert_eq!(gateway("att"), Some("txt.att.net"));
        assert_eq!(gateway("metropcs"), Some("mymetropcs.com"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(gateway("Verizon"), Some("vtext.com"));
        assert_eq!(gateway("TMOBILE"), Some("tmomail.net"));
    }

    #[test]
    fn unknown_carrier_is_none() {
        assert_eq!(gateway("rogers"), None);
        assert_eq!(gateway(""), None);
    }

    #[test]
    fn all_eight_carriers_listed() {
        assert_eq!(CARRIER_GATEWAYS.len(), 8);
        let listing = supported_carriers();
        for key in [
            "att", "verizon", "tmobile", "sprint", "uscellular", "cricket", "boost", "metropcs",
        ] {
            assert!(listing.contains(key), "missing {key} in {listing}");
        }
    }
}
