use sa_phone_recon::domain::phone::{canonicalize, is_valid, ValidPhone};
use sa_phone_recon::ReconError;

#[test]
fn test_concrete_scenarios() {
    assert!(is_valid("0821234567"));
    assert_eq!(canonicalize("0821234567").unwrap().as_str(), "+27821234567");

    assert!(!is_valid("0121234567"));
    assert!(matches!(
        canonicalize("0121234567"),
        Err(ReconError::InvalidPhoneNumber { .. })
    ));

    assert!(is_valid("+27821234567"));
    assert_eq!(canonicalize("+27821234567").unwrap().as_str(), "+27821234567");
}

#[test]
fn test_only_mobile_first_digits_are_accepted() {
    for digit in '0'..='9' {
        let national = format!("0{}12345678", digit);
        let international = format!("+27{}12345678", digit);
        let expected = matches!(digit, '6' | '7' | '8');

        assert_eq!(is_valid(&national), expected, "{}", national);
        assert_eq!(is_valid(&international), expected, "{}", international);
    }
}

#[test]
fn test_subscriber_length_must_be_exactly_eight() {
    for len in 0..12 {
        let subscriber = "1".repeat(len);
        let national = format!("08{}", subscriber);
        let international = format!("+278{}", subscriber);

        assert_eq!(is_valid(&national), len == 8, "{}", national);
        assert_eq!(is_valid(&international), len == 8, "{}", international);
    }
}

#[test]
fn test_every_valid_number_normalizes_to_international_form() {
    for digit in ['6', '7', '8'] {
        for tail in ["00000000", "12345678", "99999999"] {
            let national = format!("0{}{}", digit, tail);
            let expected = format!("+27{}{}", digit, tail);

            let number = ValidPhone::parse(&national).unwrap().normalize();
            assert_eq!(number.as_str(), expected);

            // already canonical input comes back unchanged
            let again = ValidPhone::parse(number.as_str()).unwrap().normalize();
            assert_eq!(again, number);
        }
    }
}

#[test]
fn test_separators_and_other_prefixes_are_rejected() {
    for candidate in [
        "",
        "082-123-4567",
        "(082) 123 4567",
        "+27 82 123 4567",
        "0027821234567",
        "+26821234567",
        "+2782123456x",
        "0821234567 ",
    ] {
        assert!(!is_valid(candidate), "{:?}", candidate);
    }
}
