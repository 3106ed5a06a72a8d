//! Orders the post-kind [`Document`]s and threads the newer/older navigation
//! chain through them. Links are positions in the sorted list rather than
//! references, so the list owns every post outright.

use crate::document::Document;

/// A post-kind document and the positions of its neighbours in the
/// [`PostList`].
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub document: Document,

    /// The position of the next more recent post, if any.
    pub newer: Option<usize>,

    /// The position of the next less recent post, if any.
    pub older: Option<usize>,
}

/// Posts sorted most recent first.
#[derive(Debug, Default)]
pub struct PostList {
    posts: Vec<Post>,
}

impl PostList {
    /// Sorts `documents` by date, most recent first, and links neighbours.
    /// The sort is stable, so posts sharing a date keep the order in which
    /// they were read (file name order).
    pub fn assemble(mut documents: Vec<Document>) -> PostList {
        documents.sort_by(|a, b| b.date.cmp(&a.date));

        let last = documents.len().saturating_sub(1);
        let posts = documents
            .into_iter()
            .enumerate()
            .map(|(i, document)| Post {
                document,
                newer: match i {
                    0 => None,
                    _ => Some(i - 1),
                },
                older: match i < last {
                    true => Some(i + 1),
                    false => None,
                },
            })
            .collect();
        PostList { posts }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter()
    }

    /// The `n` most recent posts.
    pub fn recent(&self, n: usize) -> &[Post] {
        &self.posts[..n.min(self.posts.len())]
    }

    pub fn newer(&self, post: &Post) -> Option<&Post> {
        post.newer.and_then(|i| self.posts.get(i))
    }

    pub fn older(&self, post: &Post) -> Option<&Post> {
        post.older.and_then(|i| self.posts.get(i))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document::Kind;
    use chrono::{NaiveDate, NaiveDateTime};
    use url::Url;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn document(slug: &str, date: NaiveDateTime) -> Document {
        Document {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            kind: Kind::Post,
            date,
            raw: String::new(),
            body: String::new(),
            excerpt: String::new(),
            url: format!("{}.html", slug),
            full_url: Url::parse("https://example.org/")
                .and_then(|u| u.join(&format!("{}.html", slug)))
                .unwrap(),
            image: None,
            metadata: Default::default(),
        }
    }

    fn slugs(list: &PostList) -> Vec<&str> {
        list.iter().map(|p| p.document.slug.as_str()).collect()
    }

    #[test]
    fn test_sorted_most_recent_first() {
        let list = PostList::assemble(vec![
            document("a", date(2024, 1, 1)),
            document("b", date(2024, 3, 1)),
            document("c", date(2023, 12, 31)),
        ]);
        assert_eq!(vec!["b", "a", "c"], slugs(&list));
    }

    #[test]
    fn test_ties_keep_read_order() {
        let list = PostList::assemble(vec![
            document("a", date(2024, 1, 1)),
            document("b", date(2024, 2, 1)),
            document("c", date(2024, 1, 1)),
            document("d", date(2024, 1, 1)),
        ]);
        assert_eq!(vec!["b", "a", "c", "d"], slugs(&list));
    }

    #[test]
    fn test_links() {
        let list = PostList::assemble(vec![
            document("a", date(2024, 1, 1)),
            document("b", date(2024, 2, 1)),
            document("c", date(2024, 3, 1)),
            document("d", date(2024, 4, 1)),
        ]);
        let posts: Vec<&Post> = list.iter().collect();

        assert_eq!(None, list.newer(posts[0]));
        assert_eq!(None, list.older(posts[posts.len() - 1]));
        for i in 1..posts.len() - 1 {
            assert_eq!(Some(posts[i - 1]), list.newer(posts[i]));
            assert_eq!(Some(posts[i + 1]), list.older(posts[i]));
        }
        assert_eq!(Some(posts[1]), list.older(posts[0]));
        assert_eq!(Some(posts[2]), list.newer(posts[3]));
    }

    #[test]
    fn test_single_post_has_no_links() {
        let list = PostList::assemble(vec![document("only", date(2024, 1, 1))]);
        let post = list.iter().next().unwrap();
        assert_eq!(None, post.newer);
        assert_eq!(None, post.older);
    }

    #[test]
    fn test_empty() {
        let list = PostList::assemble(Vec::new());
        assert!(list.is_empty());
        assert!(list.recent(10).is_empty());
    }

    #[test]
    fn test_recent() {
        let documents = (1..=12).map(|d| document(&d.to_string(), date(2024, 1, d))).collect();
        let list = PostList::assemble(documents);
        let recent: Vec<&str> = list.recent(10).iter().map(|p| p.document.slug.as_str()).collect();
        assert_eq!(10, recent.len());
        assert_eq!("12", recent[0]);
        assert_eq!("3", recent[9]);
    }
}
