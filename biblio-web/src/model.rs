//! In-memory author catalog
//!
//! The CRUD collaborator behind the secured API. Ids are server-assigned
//! from an atomic counter; a client-supplied id is invalid input. Reads and
//! writes share a read-write lock like the credential store.

use crate::error::{ApiError, ApiResult};
use crate::pagination::Page;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// An author record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Server-assigned; 0 means "not yet assigned" on inbound payloads.
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub firstname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

/// Listing parameters: filters, sort key and page coordinates
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default)]
    pub sort_key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

impl Default for AuthorQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            sort_key: None,
            name: None,
            firstname: None,
            biography: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Name,
    Firstname,
}

impl SortKey {
    fn parse(value: Option<&str>) -> ApiResult<Self> {
        match value {
            None => Ok(SortKey::Name),
            Some(key) => match key.to_lowercase().as_str() {
                "name" => Ok(SortKey::Name),
                "firstname" => Ok(SortKey::Firstname),
                other => Err(ApiError::InvalidInput(format!("Unknown sort key: {}", other))),
            },
        }
    }
}

/// The in-memory catalog
#[derive(Debug, Default)]
pub struct Library {
    authors: RwLock<HashMap<u64, Author>>,
    last_id: AtomicU64,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new author. The id must be unassigned.
    pub fn add(&self, mut author: Author) -> ApiResult<Author> {
        if author.id != 0 {
            return Err(ApiError::InvalidInput(
                "Author id is server-assigned".to_string(),
            ));
        }
        author.id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.authors.write().unwrap().insert(author.id, author.clone());
        Ok(author)
    }

    /// Replace the author stored under `id`.
    pub fn update(&self, id: u64, mut author: Author) -> ApiResult<Author> {
        if author.id != 0 {
            return Err(ApiError::InvalidInput(
                "Author id is server-assigned".to_string(),
            ));
        }
        author.id = id;
        let mut authors = self.authors.write().unwrap();
        if !authors.contains_key(&id) {
            return Err(ApiError::NotFound);
        }
        authors.insert(id, author.clone());
        Ok(author)
    }

    pub fn remove(&self, id: u64) -> ApiResult<()> {
        match self.authors.write().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound),
        }
    }

    pub fn get(&self, id: u64) -> ApiResult<Author> {
        self.authors
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    /// Every author, ordered by id.
    pub fn all(&self) -> Vec<Author> {
        let mut authors: Vec<Author> = self.authors.read().unwrap().values().cloned().collect();
        authors.sort_by_key(|author| author.id);
        authors
    }

    pub fn clear(&self) {
        self.authors.write().unwrap().clear();
        self.last_id.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.authors.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.read().unwrap().is_empty()
    }

    /// Reset and insert the two demo authors.
    pub fn seed_demo(&self) -> ApiResult<usize> {
        self.clear();
        self.add(Author {
            id: 0,
            name: "Martin".to_string(),
            firstname: "Alfred".to_string(),
            biography: None,
        })?;
        self.add(Author {
            id: 0,
            name: "Durand".to_string(),
            firstname: "Marie".to_string(),
            biography: None,
        })?;
        Ok(self.len())
    }

    /// Reset and insert `count` authors with random names.
    pub fn seed_random(&self, count: usize) -> ApiResult<usize> {
        self.clear();
        for _ in 0..count {
            self.add(Author {
                id: 0,
                name: random_name(),
                firstname: random_name(),
                biography: None,
            })?;
        }
        Ok(self.len())
    }

    /// Sorted and filtered listing, without pagination.
    pub fn filtered(&self, query: &AuthorQuery) -> ApiResult<Vec<Author>> {
        let sort_key = SortKey::parse(query.sort_key.as_deref())?;
        let mut authors: Vec<Author> = self
            .authors
            .read()
            .unwrap()
            .values()
            .filter(|author| matches_filters(author, query))
            .cloned()
            .collect();
        match sort_key {
            SortKey::Name => authors.sort_by(|a, b| a.name.cmp(&b.name)),
            SortKey::Firstname => authors.sort_by(|a, b| a.firstname.cmp(&b.firstname)),
        }
        Ok(authors)
    }

    /// One page of the sorted, filtered listing.
    ///
    /// The element total is counted after filtering and before the page
    /// window is applied, so the envelope describes the whole result set.
    pub fn page(&self, query: &AuthorQuery) -> ApiResult<Page<Author>> {
        if query.page == 0 || query.page_size == 0 {
            return Err(ApiError::InvalidInput(
                "page and pageSize must be at least 1".to_string(),
            ));
        }
        let authors = self.filtered(query)?;
        let element_total = authors.len() as u64;
        let skip = (query.page_size * (query.page - 1)) as usize;
        let content: Vec<Author> = authors
            .into_iter()
            .skip(skip)
            .take(query.page_size as usize)
            .collect();
        Ok(Page::new(query.page_size, query.page, element_total, content))
    }
}

fn matches_filters(author: &Author, query: &AuthorQuery) -> bool {
    if let Some(name) = &query.name {
        if !author.name.eq_ignore_ascii_case(name) {
            return false;
        }
    }
    if let Some(firstname) = &query.firstname {
        if !author.firstname.eq_ignore_ascii_case(firstname) {
            return false;
        }
    }
    if let Some(biography) = &query.biography {
        match &author.biography {
            Some(text) if text.contains(biography.as_str()) => {}
            _ => return false,
        }
    }
    true
}

fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let length = rng.gen_range(2..8);
    (0..length).map(|_| rng.gen_range('a'..='z')).collect()
}
