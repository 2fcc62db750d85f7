use std::io::Read;

/// Decoded `application/x-www-form-urlencoded` body or query string.
pub struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    pub fn parse(body: &str) -> Form {
        let pairs = url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Form { pairs }
    }

    /// Reads the whole request body and parses it.
    pub fn from_request(request: &mut tiny_http::Request) -> Form {
        let mut body = String::new();
        let _ = request.as_reader().read_to_string(&mut body);
        Form::parse(&body)
    }

    /// First value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Missing or unparsable values read as `None`.
    pub fn number<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }
}
