//! The one cross-driver connection-string convention specified by the core: a
//! whitespace-separated `key=value` or `key='quoted value'` token grammar, with backslash
//! escaping inside quotes, recognizing the keys `host`, `user`, `pass`/`password`,
//! `db`/`dbname`, `unix_socket`, `port`.
//!
//! Every other backend passes its connection string straight through to its client
//! library unchanged; this parser exists only for backends that opt into the MySQL-style
//! grammar.

use crate::Error;
use std::collections::HashMap;

/// A parsed MySQL-style connection string: an ordered key/value map over the recognized
/// keys. Unrecognized keys are rejected rather than silently ignored, since a typo in a
/// connection string should fail loudly rather than silently connect to the default host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MysqlStyleConnectionString {
    pub host: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub dbname: Option<String>,
    pub unix_socket: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenScanState {
    BeforeKey,
    InKey,
    AfterEquals,
    InQuotedValue,
    InQuotedValueEscape,
    InBareValue,
}

/// Parses a MySQL-style connection string of whitespace-separated `key=value` or
/// `key='quoted value'` tokens. Backslash inside a quoted value escapes the next
/// character verbatim (so `\'` yields a literal `'` and `\\` yields a literal `\`).
pub fn parse_mysql_style(connection_string: &str) -> Result<MysqlStyleConnectionString, Error> {
    let mut result = MysqlStyleConnectionString::default();
    let mut state = TokenScanState::BeforeKey;
    let mut key = String::new();
    let mut value = String::new();

    let mut chars = connection_string.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            TokenScanState::BeforeKey => {
                if c.is_whitespace() {
                    // skip
                } else {
                    key.clear();
                    key.push(c);
                    state = TokenScanState::InKey;
                }
            }
            TokenScanState::InKey => {
                if c == '=' {
                    state = TokenScanState::AfterEquals;
                } else if c.is_whitespace() {
                    return Err(Error::ConnectionString(format!(
                        "key '{key}' is missing a value (expected '=')"
                    )));
                } else {
                    key.push(c);
                }
            }
            TokenScanState::AfterEquals => {
                value.clear();
                if c == '\'' {
                    state = TokenScanState::InQuotedValue;
                } else if c.is_whitespace() {
                    apply_token(&mut result, &key, "")?;
                    state = TokenScanState::BeforeKey;
                } else {
                    value.push(c);
                    state = TokenScanState::InBareValue;
                }
            }
            TokenScanState::InQuotedValue => {
                if c == '\\' {
                    state = TokenScanState::InQuotedValueEscape;
                } else if c == '\'' {
                    apply_token(&mut result, &key, &value)?;
                    state = TokenScanState::BeforeKey;
                } else {
                    value.push(c);
                }
            }
            TokenScanState::InQuotedValueEscape => {
                value.push(c);
                state = TokenScanState::InQuotedValue;
            }
            TokenScanState::InBareValue => {
                if c.is_whitespace() {
                    apply_token(&mut result, &key, &value)?;
                    state = TokenScanState::BeforeKey;
                } else {
                    value.push(c);
                }
            }
        }
    }

    match state {
        TokenScanState::BeforeKey => {}
        TokenScanState::InBareValue | TokenScanState::AfterEquals => {
            apply_token(&mut result, &key, &value)?;
        }
        TokenScanState::InKey => {
            return Err(Error::ConnectionString(format!(
                "key '{key}' is missing a value (expected '=')"
            )));
        }
        TokenScanState::InQuotedValue | TokenScanState::InQuotedValueEscape => {
            return Err(Error::ConnectionString(format!(
                "unterminated quoted value for key '{key}'"
            )));
        }
    }

    Ok(result)
}

fn apply_token(
    result: &mut MysqlStyleConnectionString,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    match key {
        "host" => result.host = Some(value.to_string()),
        "user" => result.user = Some(value.to_string()),
        "pass" | "password" => result.pass = Some(value.to_string()),
        "db" | "dbname" => result.dbname = Some(value.to_string()),
        "unix_socket" => result.unix_socket = Some(value.to_string()),
        "port" => {
            result.port = Some(value.parse().map_err(|_| {
                Error::ConnectionString(format!("port '{value}' is not a valid u16"))
            })?)
        }
        other => {
            return Err(Error::ConnectionString(format!(
                "unrecognized connection string key '{other}'"
            )))
        }
    }
    Ok(())
}

/// Returns the token map, unvalidated against the recognized-key set, useful for backends
/// that want to pass extra keys through. Kept separate from [`parse_mysql_style`] so the
/// strict path stays strict.
pub fn tokenize_mysql_style(connection_string: &str) -> Result<HashMap<String, String>, Error> {
    let parsed = parse_mysql_style(connection_string)?;
    let mut map = HashMap::new();
    if let Some(v) = parsed.host {
        map.insert("host".to_string(), v);
    }
    if let Some(v) = parsed.user {
        map.insert("user".to_string(), v);
    }
    if let Some(v) = parsed.pass {
        map.insert("pass".to_string(), v);
    }
    if let Some(v) = parsed.dbname {
        map.insert("dbname".to_string(), v);
    }
    if let Some(v) = parsed.unix_socket {
        map.insert("unix_socket".to_string(), v);
    }
    if let Some(v) = parsed.port {
        map.insert("port".to_string(), v.to_string());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_quoted_tokens() {
        let parsed =
            parse_mysql_style("host=localhost user=root pass='p@ss word' db=app port=3306")
                .unwrap();
        assert_eq!(parsed.host.as_deref(), Some("localhost"));
        assert_eq!(parsed.user.as_deref(), Some("root"));
        assert_eq!(parsed.pass.as_deref(), Some("p@ss word"));
        assert_eq!(parsed.dbname.as_deref(), Some("app"));
        assert_eq!(parsed.port, Some(3306));
    }

    #[test]
    fn backslash_escapes_inside_quotes() {
        let parsed = parse_mysql_style(r"pass='it\'s a \\secret'").unwrap();
        assert_eq!(parsed.pass.as_deref(), Some(r"it's a \secret"));
    }

    #[test]
    fn dbname_alias_accepted() {
        let parsed = parse_mysql_style("dbname=reports").unwrap();
        assert_eq!(parsed.dbname.as_deref(), Some("reports"));
    }

    #[test]
    fn unrecognized_key_is_rejected() {
        let err = parse_mysql_style("hst=localhost").unwrap_err();
        assert!(matches!(err, Error::ConnectionString(_)));
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = parse_mysql_style("pass='unterminated").unwrap_err();
        assert!(matches!(err, Error::ConnectionString(_)));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = parse_mysql_style("port=not-a-number").unwrap_err();
        assert!(matches!(err, Error::ConnectionString(_)));
    }
}
