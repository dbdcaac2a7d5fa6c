use super::*;

#[test]
fn required_trims_and_rejects_blank() {
    assert_eq!(required("  Ada "), Ok("Ada"));
    assert_eq!(required("   "), Err(FieldError::Required));
}

#[test]
fn email_accepts_common_addresses() {
    for ok in ["a@b.com", "first.last+tag@example.co.uk", "x@localhost", " a@b.com "] {
        assert!(email(ok).is_ok(), "expected {ok:?} to be valid");
    }
}

#[test]
fn email_rejects_malformed_addresses() {
    for bad in ["plain", "@b.com", "a@", "a@@b.com", "a b@c.com", "a@b..com", "a@-b.com", ".a@b.com"] {
        assert_eq!(email(bad), Err(FieldError::InvalidEmail), "expected {bad:?} to be invalid");
    }
    assert_eq!(email(""), Err(FieldError::Required));
}

#[test]
fn code_requires_exactly_six_digits() {
    assert_eq!(code("123456"), Ok("123456"));
    assert_eq!(code(""), Err(FieldError::Required));
    for bad in ["12345", "1234567", "12a456", " 123456", "１２３４５６"] {
        assert_eq!(code(bad), Err(FieldError::InvalidCode), "expected {bad:?} to be invalid");
    }
}

#[test]
fn password_enforces_minimum_length() {
    assert_eq!(password("", 8), Err(FieldError::Required));
    assert_eq!(password("short", 8), Err(FieldError::TooShort(8)));
    assert_eq!(password("longenough", 8), Ok("longenough"));
}

#[test]
fn confirmation_must_match() {
    assert_eq!(confirmation("abcdefgh", ""), Err(FieldError::Required));
    assert_eq!(confirmation("abcdefgh", "abcdefgx"), Err(FieldError::Mismatch));
    assert_eq!(confirmation("abcdefgh", "abcdefgh"), Ok(()));
}

#[test]
fn sanitize_code_input_keeps_six_digits() {
    assert_eq!(sanitize_code_input("12-34 56"), "123456");
    assert_eq!(sanitize_code_input("1234567890"), "123456");
    assert_eq!(sanitize_code_input("abc"), "");
}

#[test]
fn field_error_messages_are_user_facing() {
    assert_eq!(FieldError::TooShort(8).to_string(), "Password must be at least 8 characters");
    assert_eq!(FieldError::Mismatch.to_string(), "Passwords do not match");
}
