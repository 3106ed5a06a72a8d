//! Converts documents and posts into template [`Value`]s.

use crate::date::DATE_FORMAT;
use crate::document::Document;
use crate::posts::{Post, PostList};
use chrono::{NaiveDateTime, TimeZone, Utc};
use gtmpl_value::Value;
use std::collections::HashMap;

/// How dates are shown on pages.
pub const DISPLAY_DATE_FORMAT: &str = "%Y.%m.%d";

/// Formats a date for feeds (RFC 2822). Dates are written as UTC so the
/// output doesn't depend on the building machine's timezone.
pub fn feed_date(date: &NaiveDateTime) -> String {
    Utc.from_utc_datetime(date).to_rfc2822()
}

pub fn string<S: Into<String>>(s: S) -> Value {
    Value::String(s.into())
}

fn option(opt: &Option<String>) -> Value {
    match opt {
        Some(s) => string(s.as_str()),
        None => Value::Nil,
    }
}

impl From<&Document> for Value {
    /// Converts a [`Document`] into a [`Value::Object`] with the document's
    /// fields, its dates in each of the formats templates need, and its full
    /// metadata under `meta`.
    fn from(d: &Document) -> Value {
        let meta = d
            .metadata
            .iter()
            .map(|(k, values)| {
                (
                    k.clone(),
                    Value::Array(values.iter().map(|v| string(v.as_str())).collect()),
                )
            })
            .collect::<HashMap<String, Value>>();

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("slug".to_owned(), string(d.slug.as_str()));
        m.insert("title".to_owned(), string(d.title.as_str()));
        m.insert("kind".to_owned(), string(d.kind.as_str()));
        m.insert(
            "date".to_owned(),
            string(d.date.format(DISPLAY_DATE_FORMAT).to_string()),
        );
        m.insert(
            "date_iso".to_owned(),
            string(d.date.format(DATE_FORMAT).to_string()),
        );
        m.insert("pub_date".to_owned(), string(feed_date(&d.date)));
        m.insert("body".to_owned(), string(d.body.as_str()));
        m.insert("excerpt".to_owned(), string(d.excerpt.as_str()));
        m.insert("url".to_owned(), string(d.url.as_str()));
        m.insert("full_url".to_owned(), string(d.full_url.as_str()));
        m.insert("image".to_owned(), option(&d.image));
        m.insert("meta".to_owned(), Value::Object(meta));
        Value::Object(m)
    }
}

/// Converts a post into a [`Value`]: the document's fields plus `newer` and
/// `older`, each the neighbouring document or nil at the ends of the list.
pub fn post(list: &PostList, post: &Post) -> Value {
    let neighbour = |p: Option<&Post>| match p {
        Some(p) => Value::from(&p.document),
        None => Value::Nil,
    };

    let mut value = Value::from(&post.document);
    if let Value::Object(m) = &mut value {
        m.insert("newer".to_owned(), neighbour(list.newer(post)));
        m.insert("older".to_owned(), neighbour(list.older(post)));
    }
    value
}

/// Converts a run of posts into a [`Value::Array`] of documents.
pub fn posts<'a>(posts: impl Iterator<Item = &'a Post>) -> Value {
    Value::Array(posts.map(|p| Value::from(&p.document)).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Kind;
    use chrono::NaiveDate;
    use url::Url;

    fn document(slug: &str, day: u32) -> Document {
        let date = NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let mut metadata = crate::markdown::Metadata::new();
        metadata.insert("mood".to_owned(), vec!["sunny".to_owned()]);
        Document {
            slug: slug.to_owned(),
            title: slug.to_uppercase(),
            kind: Kind::Post,
            date,
            raw: String::new(),
            body: "<p>body</p>".to_owned(),
            excerpt: "body".to_owned(),
            url: format!("{}.html", slug),
            full_url: Url::parse("https://example.org/")
                .and_then(|u| u.join(&format!("{}.html", slug)))
                .unwrap(),
            image: None,
            metadata,
        }
    }

    fn field<'v>(value: &'v Value, key: &str) -> &'v Value {
        match value {
            Value::Object(m) => &m[key],
            _ => panic!("`{}` is not an object", key),
        }
    }

    fn as_str(value: &Value) -> &str {
        match value {
            Value::String(s) => s,
            _ => panic!("not a string"),
        }
    }

    #[test]
    fn test_document_value() {
        let value = Value::from(&document("hello", 5));
        assert_eq!("HELLO", as_str(field(&value, "title")));
        assert_eq!("2024.01.05", as_str(field(&value, "date")));
        assert_eq!("2024-01-05", as_str(field(&value, "date_iso")));
        let pub_date = as_str(field(&value, "pub_date"));
        assert!(pub_date.starts_with("Fri, "), "{}", pub_date);
        assert!(pub_date.ends_with("Jan 2024 00:00:00 +0000"), "{}", pub_date);
        assert_eq!(
            "https://example.org/hello.html",
            as_str(field(&value, "full_url"))
        );
        assert!(matches!(field(&value, "image"), Value::Nil));
        match &value {
            Value::Object(m) => assert!(!m.contains_key("newer") && !m.contains_key("older")),
            _ => panic!("not an object"),
        }
        match field(field(&value, "meta"), "mood") {
            Value::Array(values) => assert_eq!("sunny", as_str(&values[0])),
            _ => panic!("`mood` is not an array"),
        }
    }

    #[test]
    fn test_post_value_links() {
        let list = PostList::assemble(vec![document("old", 1), document("new", 2)]);
        let posts: Vec<&Post> = list.iter().collect();

        let newest = post(&list, posts[0]);
        assert!(matches!(field(&newest, "newer"), Value::Nil));
        assert_eq!("old", as_str(field(field(&newest, "older"), "slug")));

        let oldest = post(&list, posts[1]);
        assert_eq!("new", as_str(field(field(&oldest, "newer"), "slug")));
        assert!(matches!(field(&oldest, "older"), Value::Nil));
    }
}
