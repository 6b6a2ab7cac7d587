//! Quick view URL building.

use url::Url;

use crate::error::BridgeError;

/// Set `param=1` on `url`, replacing any existing value of `param`.
pub fn with_flag(url: &mut Url, param: &str) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (key, value) in &kept {
        pairs.append_pair(key, value);
    }
    pairs.append_pair(param, "1");
}

/// Reject targets that cannot be opened in the overlay.
pub fn check_target(target: &str) -> Result<&str, BridgeError> {
    let target = target.trim();
    let is_script = target
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"));
    if target.is_empty() || target == "#" || is_script {
        return Err(BridgeError::InvalidTarget(target.to_string()));
    }
    Ok(target)
}

/// Resolve a URL or a bare numeric post id against `home`.
pub fn resolve_target(home: &Url, target: &str) -> Result<Url, BridgeError> {
    let target = check_target(target)?;
    if target.bytes().all(|b| b.is_ascii_digit()) {
        let mut url = home.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut().append_pair("p", target);
        return Ok(url);
    }
    Ok(home.join(target)?)
}

/// Resolve `target` against `home` and refuse to leave its origin.
pub fn same_origin(home: &Url, target: &str) -> Result<Url, BridgeError> {
    let url = resolve_target(home, target)?;
    if url.origin() != home.origin() {
        return Err(BridgeError::CrossOrigin(url.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> Url {
        Url::parse("https://shop.example/").unwrap()
    }

    #[test]
    fn test_with_flag_appends() {
        let mut url = Url::parse("https://shop.example/product/kit/?color=red").unwrap();
        with_flag(&mut url, "tpb_qv");
        assert_eq!(url.as_str(), "https://shop.example/product/kit/?color=red&tpb_qv=1");
    }

    #[test]
    fn test_with_flag_replaces_existing_value() {
        let mut url = Url::parse("https://shop.example/?tpb_qv=0&p=7").unwrap();
        with_flag(&mut url, "tpb_qv");
        assert_eq!(url.as_str(), "https://shop.example/?p=7&tpb_qv=1");
    }

    #[test]
    fn test_numeric_target_is_post_id() {
        let url = resolve_target(&home(), "1234").unwrap();
        assert_eq!(url.as_str(), "https://shop.example/?p=1234");
    }

    #[test]
    fn test_relative_target_joins_home() {
        let url = resolve_target(&home(), "/product/kit/").unwrap();
        assert_eq!(url.as_str(), "https://shop.example/product/kit/");
    }

    #[test]
    fn test_rejects_unusable_targets() {
        for target in ["", "  ", "#", "javascript:void(0)", "JavaScript:alert(1)"] {
            assert!(
                matches!(check_target(target), Err(BridgeError::InvalidTarget(_))),
                "{target:?} accepted"
            );
        }
    }

    #[test]
    fn test_same_origin_refuses_foreign_host() {
        let result = same_origin(&home(), "https://evil.example/cart/");
        assert!(matches!(result, Err(BridgeError::CrossOrigin(_))));
        assert!(same_origin(&home(), "/cart/").is_ok());
    }
}
