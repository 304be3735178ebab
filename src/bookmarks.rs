use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    hash::Hash,
    io::ErrorKind,
    sync::{Arc, RwLock},
    time::Instant,
};

/// A bookmark as seen by the duplicate engine. The engine only ever reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: u64,

    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    /// Order is kept as stored; values may repeat.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_favorite: bool,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    #[serde(default)]
    pub visits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl Hash for Bookmark {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookmarkCreate {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl BookmarkCreate {
    /// The bookmark this request would produce, stamped with `now` and a placeholder id.
    /// Used to check for duplicates before anything is written.
    pub fn to_candidate(&self, now: DateTime<Utc>) -> Bookmark {
        Bookmark {
            id: 0,
            title: self.title.clone().unwrap_or_default(),
            url: self.url.clone(),
            description: self.description.clone(),
            category: self.category.clone().unwrap_or_default(),
            tags: dedup_tags(self.tags.clone().unwrap_or_default()),
            is_favorite: self.is_favorite,
            date_added: now,
            date_modified: now,
            visits: 0,
            favicon: self.favicon.clone(),
        }
    }
}

/// Partial update. `None` leaves a field alone; for the optional fields
/// `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BookmarkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visits: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<Option<String>>,
}

impl BookmarkUpdate {
    /// Every field of a merged record, ready to be written onto the primary.
    pub fn from_merged(merged: &Bookmark) -> Self {
        Self {
            title: Some(merged.title.clone()),
            url: Some(merged.url.clone()),
            description: Some(merged.description.clone()),
            category: Some(merged.category.clone()),
            tags: Some(merged.tags.clone()),
            is_favorite: Some(merged.is_favorite),
            date_added: Some(merged.date_added),
            date_modified: Some(merged.date_modified),
            visits: Some(merged.visits),
            favicon: Some(merged.favicon.clone()),
        }
    }

    fn apply(self, bmark: &mut Bookmark) {
        if let Some(title) = self.title {
            bmark.title = title;
        }
        if let Some(url) = self.url {
            bmark.url = url;
        }
        if let Some(descr) = self.description {
            bmark.description = descr;
        }
        if let Some(category) = self.category {
            bmark.category = category;
        }
        if let Some(tags) = self.tags {
            bmark.tags = tags;
        }
        if let Some(is_favorite) = self.is_favorite {
            bmark.is_favorite = is_favorite;
        }
        if let Some(date_added) = self.date_added {
            bmark.date_added = date_added;
        }
        if let Some(date_modified) = self.date_modified {
            bmark.date_modified = date_modified;
        }
        if let Some(visits) = self.visits {
            bmark.visits = visits;
        }
        if let Some(favicon) = self.favicon {
            bmark.favicon = favicon;
        }
    }
}

/// Storage the integration layer reads from and writes merge results back to.
pub trait BookmarkManager: Send + Sync {
    fn list(&self) -> anyhow::Result<Vec<Bookmark>>;
    fn get(&self, id: u64) -> anyhow::Result<Option<Bookmark>>;
    fn create(&self, bookmark: BookmarkCreate) -> anyhow::Result<Bookmark>;
    fn update(&self, id: u64, update: BookmarkUpdate) -> anyhow::Result<Bookmark>;
    fn delete(&self, id: u64) -> anyhow::Result<()>;
}

/// Tags are stored comma separated, so a comma inside one cannot be read back.
fn check_tags(tags: &[String]) -> anyhow::Result<()> {
    match tags.iter().find(|tag| tag.contains(',')) {
        Some(tag) => Err(anyhow!("tag {tag:?} contains a comma")),
        None => Ok(()),
    }
}

fn dedup_tags(mut tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.retain(|item| seen.insert(item.clone()));
    tags
}

#[derive(Debug, Clone, Default)]
pub struct BackendCsv {
    list: Arc<RwLock<Vec<Bookmark>>>,
    path: String,
}

const CSV_HEADERS: [&str; 11] = [
    "id",
    "url",
    "title",
    "description",
    "category",
    "tags",
    "is_favorite",
    "date_added",
    "date_modified",
    "visits",
    "favicon",
];

fn field<'a>(record: &'a StringRecord, idx: usize) -> anyhow::Result<&'a str> {
    record
        .get(idx)
        .ok_or_else(|| anyhow!("couldnt get record {}", CSV_HEADERS[idx]))
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_date(value: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid date {value:?}"))?
        .with_timezone(&Utc))
}

impl BackendCsv {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if let Err(err) = std::fs::metadata(path) {
            match err.kind() {
                ErrorKind::NotFound => {
                    log::info!("Creating new database at {path}");
                    let mut csv_wrt = csv::Writer::from_path(path)?;
                    csv_wrt.write_record(CSV_HEADERS)?;
                    csv_wrt.flush()?;
                }
                _ => Err(err)?,
            }
        }

        let now = Instant::now();
        let mut csv_reader = csv::Reader::from_path(path)?;

        let mut bmarks = vec![];
        for record in csv_reader.records() {
            let record = record?;
            let id = field(&record, 0)?.parse::<u64>()?;

            let bmark = Bookmark {
                id,
                url: field(&record, 1)?.to_string(),
                title: field(&record, 2)?.to_string(),
                description: optional(field(&record, 3)?),
                category: field(&record, 4)?.to_string(),
                tags: field(&record, 5)?
                    .split(',')
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect(),
                is_favorite: field(&record, 6)? == "true",
                date_added: parse_date(field(&record, 7)?)
                    .with_context(|| format!("bookmark #{id}"))?,
                date_modified: parse_date(field(&record, 8)?)
                    .with_context(|| format!("bookmark #{id}"))?,
                visits: field(&record, 9)?
                    .parse::<u64>()
                    .with_context(|| format!("bookmark #{id}: invalid visits"))?,
                favicon: optional(field(&record, 10)?),
            };

            bmarks.push(bmark);
        }

        log::debug!(
            "took {}ms to read csv",
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Ok(BackendCsv {
            list: Arc::new(RwLock::new(bmarks)),
            path: path.to_string(),
        })
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let bmarks = self.list.read().unwrap();

        let temp_path = format!("{}-tmp", &self.path);
        let mut csv_wrt = csv::Writer::from_path(&temp_path)?;
        csv_wrt.write_record(CSV_HEADERS)?;
        for bmark in bmarks.iter() {
            csv_wrt.write_record([
                bmark.id.to_string().as_str(),
                bmark.url.as_str(),
                bmark.title.as_str(),
                bmark.description.as_deref().unwrap_or_default(),
                bmark.category.as_str(),
                bmark.tags.join(",").as_str(),
                if bmark.is_favorite { "true" } else { "false" },
                bmark.date_added.to_rfc3339().as_str(),
                bmark.date_modified.to_rfc3339().as_str(),
                bmark.visits.to_string().as_str(),
                bmark.favicon.as_deref().unwrap_or_default(),
            ])?;
        }
        csv_wrt.flush()?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Insert a fully formed bookmark, keeping its id and dates.
    pub fn insert(&self, bookmark: Bookmark) -> anyhow::Result<()> {
        check_tags(&bookmark.tags)?;
        self.list.write().unwrap().push(bookmark);
        self.save()
    }
}

impl BookmarkManager for BackendCsv {
    fn list(&self) -> anyhow::Result<Vec<Bookmark>> {
        Ok(self.list.read().unwrap().clone())
    }

    fn get(&self, id: u64) -> anyhow::Result<Option<Bookmark>> {
        Ok(self.list.read().unwrap().iter().find(|b| b.id == id).cloned())
    }

    fn create(&self, bmark_create: BookmarkCreate) -> anyhow::Result<Bookmark> {
        check_tags(bmark_create.tags.as_deref().unwrap_or_default())?;
        let mut bmarks = self.list.write().unwrap();

        let id = bmarks.iter().map(|b| b.id + 1).max().unwrap_or_default();
        let bmark = Bookmark {
            id,
            ..bmark_create.to_candidate(Utc::now())
        };

        bmarks.push(bmark.clone());
        drop(bmarks);

        self.save()?;

        Ok(bmark)
    }

    fn update(&self, id: u64, bmark_update: BookmarkUpdate) -> anyhow::Result<Bookmark> {
        check_tags(bmark_update.tags.as_deref().unwrap_or_default())?;
        let mut bmarks = self.list.write().unwrap();

        let bmark = bmarks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| anyhow!("Bookmark with id {} not found", id))?;

        bmark_update.apply(bmark);

        let result = bmark.clone();
        drop(bmarks);

        self.save()?;

        Ok(result)
    }

    fn delete(&self, id: u64) -> anyhow::Result<()> {
        let mut bmarks = self.list.write().unwrap();
        let removed = bmarks
            .iter()
            .position(|b| b.id == id)
            .map(|idx| bmarks.remove(idx));

        drop(bmarks);

        if removed.is_some() {
            self.save()?;
        }

        Ok(())
    }
}
