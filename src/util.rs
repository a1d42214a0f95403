/// Replaces each literal space with `%20`.
///
/// Nothing else is escaped: the Census API expects `&`, `/`, `,`, `:` and `*`
/// in geography clauses verbatim.
pub(crate) fn encode_spaces(s: &str) -> String {
    s.replace(' ', "%20")
}

pub(crate) fn urljoin(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

pub(crate) fn append_query(url: &str, params: &[(&str, &str)]) -> String {
    let mut out = url.to_string();
    if params.is_empty() {
        return out;
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    out.push(sep);
    let mut first = true;
    for (k, v) in params {
        if !first {
            out.push('&');
        }
        first = false;
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    out
}

/// Masks the value of the `key` query parameter so URLs can be logged.
pub(crate) fn redact_key(url: &str) -> String {
    let Some((head, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("key", v)) if !v.is_empty() => "key=***".to_string(),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", head, query)
}
