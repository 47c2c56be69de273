use serde::{Deserialize, Serialize};

use inkwell_auth::PasswordDigest;
use inkwell_core::{UserId, Validate, ValidationErrors};

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 254;

/// A registered user.
///
/// `password` only ever holds the digest of the secret chosen at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: PasswordDigest,
}

/// A user row about to be inserted (id assigned by the datastore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: PasswordDigest,
}

/// Raw signup body as received.
#[derive(Debug, Default, Deserialize)]
pub struct SignupPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated signup request. `password` is still plaintext here.
#[derive(Clone, PartialEq, Eq)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Signup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signup")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for SignupPayload {
    type Output = Signup;

    fn validate(self) -> Result<Signup, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.required_text("name", self.name, NAME_MAX_CHARS);
        let email = email_field(&mut errors, self.email);
        let password = password_field(&mut errors, self.password);

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(Signup {
                name,
                email,
                password,
            }),
            _ => Err(errors),
        }
    }
}

/// Raw signin body as received.
#[derive(Debug, Default, Deserialize)]
pub struct SigninPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated signin request.
#[derive(Clone, PartialEq, Eq)]
pub struct Signin {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Signin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signin")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Validate for SigninPayload {
    type Output = Signin;

    fn validate(self) -> Result<Signin, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = email_field(&mut errors, self.email);
        let password = password_field(&mut errors, self.password);

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => Ok(Signin { email, password }),
            _ => Err(errors),
        }
    }
}

fn email_field(errors: &mut ValidationErrors, value: Option<String>) -> Option<String> {
    let email = errors.required_text("email", value, EMAIL_MAX_CHARS)?;
    if !is_email(&email) {
        errors.push("email", "invalid_string", "email must be a valid email address");
        return None;
    }
    Some(email)
}

/// Passwords are taken verbatim: no trimming, only presence.
fn password_field(errors: &mut ValidationErrors, value: Option<String>) -> Option<String> {
    let password = errors.require("password", value)?;
    if password.is_empty() {
        errors.push("password", "too_small", "password must not be empty");
        return None;
    }
    Some(password)
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signup(name: Option<&str>, email: Option<&str>, password: Option<&str>) -> SignupPayload {
        SignupPayload {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    fn paths(errors: &ValidationErrors) -> Vec<&str> {
        errors.issues().iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn valid_signup_is_normalized() {
        let out = signup(Some(" Ann "), Some(" ann@x.com "), Some(" pw1 "))
            .validate()
            .unwrap();
        assert_eq!(out.name, "Ann");
        assert_eq!(out.email, "ann@x.com");
        assert_eq!(out.password, " pw1 ");
    }

    #[test]
    fn empty_signup_reports_every_field() {
        let errors = SignupPayload::default().validate().unwrap_err();
        assert_eq!(paths(&errors), vec!["name", "email", "password"]);
        assert!(errors.issues().iter().all(|i| i.code == "required"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for email in ["ann", "ann@", "@x.com", "ann@x", "a b@x.com", "a@b@c.com", "ann@.com"] {
            let errors = signup(Some("Ann"), Some(email), Some("pw"))
                .validate()
                .unwrap_err();
            assert_eq!(paths(&errors), vec!["email"], "email {email:?}");
            assert_eq!(errors.issues()[0].code, "invalid_string");
        }
    }

    #[test]
    fn overlong_name_is_rejected() {
        let long = "n".repeat(NAME_MAX_CHARS + 1);
        let errors = signup(Some(&long), Some("ann@x.com"), Some("pw"))
            .validate()
            .unwrap_err();
        assert_eq!(errors.issues()[0].code, "too_big");
    }

    #[test]
    fn empty_password_is_rejected() {
        let errors = SigninPayload {
            email: Some("ann@x.com".to_string()),
            password: Some(String::new()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(paths(&errors), vec!["password"]);
        assert_eq!(errors.issues()[0].code, "too_small");
    }

    #[test]
    fn signin_payload_deserializes_with_missing_fields() {
        let payload: SigninPayload = serde_json::from_str(r#"{"email":"ann@x.com"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert_eq!(paths(&errors), vec!["password"]);
    }

    #[test]
    fn debug_output_never_contains_password() {
        let out = signup(Some("Ann"), Some("ann@x.com"), Some("s3cret-value"))
            .validate()
            .unwrap();
        assert!(!format!("{out:?}").contains("s3cret-value"));
    }

    proptest! {
        /// Property: well-formed addresses are always accepted unchanged.
        #[test]
        fn well_formed_emails_validate(
            local in "[a-z0-9._+-]{1,20}",
            host in "[a-z0-9-]{1,20}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{local}@{host}.{tld}");
            let out = SigninPayload { email: Some(email.clone()), password: Some("pw".into()) }
                .validate();
            prop_assert_eq!(out.map(|s| s.email), Ok(email));
        }
    }
}
