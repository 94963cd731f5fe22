use crate::{data::Headers, error::Error};
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};

// Hop-by-hop headers describe the original connection, not the interaction. Replaying them
// makes hyper and reqwest disagree about the body framing.
const HOP_BY_HOP_HEADERS: [&str; 3] = ["transfer-encoding", "content-length", "connection"];

pub fn extract_headers(header_map: &HeaderMap) -> Headers {
    // it currently ignores header values with opaque characters
    header_map
        .iter()
        .map(|(k, v)| (String::from(k.as_str()), v.to_str()))
        .filter_map(|(key, value)| value.ok().map(|v| (key, String::from(v))))
        .collect()
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.append(header_name, header_value);
    }

    Ok(())
}

pub fn without_hop_by_hop(headers: &Headers) -> impl Iterator<Item = (&String, &String)> {
    headers
        .iter()
        .filter(|(key, _)| !HOP_BY_HOP_HEADERS.contains(&key.to_lowercase().as_str()))
}

/// Headers that must not be forwarded upstream, the client computes them again.
pub fn forwardable(headers: &Headers) -> impl Iterator<Item = (&String, &String)> {
    headers.iter().filter(|(key, _)| {
        let key = key.to_lowercase();
        key != "host" && key != "content-length"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn hop_by_hop_headers_are_not_replayed() {
        let recorded = headers(&[
            ("content-type", "application/json"),
            ("Transfer-Encoding", "chunked"),
            ("content-length", "42"),
            ("connection", "keep-alive"),
        ]);

        let replayed: Vec<_> = without_hop_by_hop(&recorded).map(|(k, _)| k.as_str()).collect();

        assert_eq!(replayed, vec!["content-type"]);
    }

    #[test]
    fn host_and_length_are_not_forwarded() {
        let received = headers(&[
            ("host", "127.0.0.1:40000"),
            ("content-length", "17"),
            ("cookie", "token=abc"),
        ]);

        let forwarded: Vec<_> = forwardable(&received).map(|(k, _)| k.as_str()).collect();

        assert_eq!(forwarded, vec!["cookie"]);
    }

    #[test]
    fn put_headers_lowercases_names() {
        let mut map = HeaderMap::new();
        put_headers(&mut map, &headers(&[("Content-Type", "text/plain")])).unwrap();

        assert_eq!(map.get("content-type").unwrap(), "text/plain");
        assert_eq!(extract_headers(&map), headers(&[("content-type", "text/plain")]));
    }
}
