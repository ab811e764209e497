/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Address → content-type classification.

use url::Url;

pub const CONTENT_TYPE_DIRECTORY: &str = "inode/directory";
pub const CONTENT_TYPE_HTML: &str = "text/html";
pub const CONTENT_TYPE_UNKNOWN: &str = "application/octet-stream";

pub trait ContentClassifier {
    fn classify(&self, address: &str) -> String;
}

impl<F> ContentClassifier for F
where
    F: Fn(&str) -> String,
{
    fn classify(&self, address: &str) -> String {
        self(address)
    }
}

/// Classifies from the address alone: scheme, trailing slash, and extension.
/// Performs no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeClassifier;

impl ContentClassifier for MimeClassifier {
    fn classify(&self, address: &str) -> String {
        let Ok(url) = Url::parse(address) else {
            if address.ends_with('/') {
                return CONTENT_TYPE_DIRECTORY.to_string();
            }
            return guess_from_path(address).unwrap_or_else(|| CONTENT_TYPE_UNKNOWN.to_string());
        };
        if url.scheme() == "dir" || (url.scheme() == "file" && url.path().ends_with('/')) {
            return CONTENT_TYPE_DIRECTORY.to_string();
        }
        if let Some(guess) = guess_from_path(url.path()) {
            return guess;
        }
        match url.scheme() {
            "http" | "https" => CONTENT_TYPE_HTML.to_string(),
            _ => CONTENT_TYPE_UNKNOWN.to_string(),
        }
    }
}

fn guess_from_path(path: &str) -> Option<String> {
    let (_, extension) = path.rsplit_once('.')?;
    if extension.is_empty() || extension.contains('/') {
        return None;
    }
    mime_guess::from_ext(extension)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
