use serde::Deserialize;
use url::Url;

// ============================================================================
// Raw Document Types
// ============================================================================

/// As-parsed shape of an RSS 2.0 document (`<rss><channel>...</channel></rss>`).
///
/// Every leaf is optional because the wire format is untrusted: presence is
/// checked by [`RawFeedDocument::validate`], which reports all violations at
/// once instead of failing on the first.
#[derive(Debug, Deserialize)]
pub struct RawFeedDocument {
    pub channel: Option<RawChannel>,
}

/// Raw `<channel>` element.
///
/// `item` is the irregular part of the format: real-world feeds emit it
/// absent, as a single element, or as a repeated sequence. Deserializing into
/// a defaulted `Vec` coerces all three shapes (absent → `[]`, single →
/// one-element, sequence unchanged), which is what makes normalization
/// idempotent.
#[derive(Debug, Deserialize)]
pub struct RawChannel {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub item: Vec<RawItem>,
}

/// Raw `<item>` element. Items missing required fields are dropped during
/// normalization rather than failing the whole document.
#[derive(Debug, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

/// One schema violation: which field, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All violations found in one document, rendered as a single diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssues(pub Vec<ValidationIssue>);

impl std::fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

// ============================================================================
// Normalized Document Types
// ============================================================================

/// A validated, normalized feed document.
///
/// Invariants: `title`, `link`, and `description` are non-empty, `link` is a
/// well-formed URL, and every entry of `items` passed presence validation for
/// all four of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}

/// One complete feed entry. All fields are guaranteed non-empty; `pub_date`
/// is kept as the raw wire string and parsed only at persistence time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

/// Result of normalizing a raw document: the document plus how many
/// incomplete items were silently dropped.
#[derive(Debug)]
pub struct NormalizeResult {
    pub document: NormalizedFeedDocument,
    pub dropped: usize,
}

impl RawFeedDocument {
    /// Validates channel metadata and normalizes the item list.
    ///
    /// Channel-level violations (missing channel, missing or empty
    /// title/link/description, malformed link URL) are accumulated and
    /// returned together. Incomplete items are not violations: they are
    /// filtered out, preserving the relative order of the survivors.
    pub fn validate(self) -> Result<NormalizeResult, ValidationIssues> {
        let mut issues = Vec::new();

        let Some(channel) = self.channel else {
            issues.push(ValidationIssue::new(
                "rss.channel",
                "required element is missing",
            ));
            return Err(ValidationIssues(issues));
        };

        let title = require_text(&mut issues, "rss.channel.title", channel.title);
        let link = require_text(&mut issues, "rss.channel.link", channel.link);
        let description = require_text(
            &mut issues,
            "rss.channel.description",
            channel.description,
        );
        if let Some(link) = &link {
            if Url::parse(link).is_err() {
                issues.push(ValidationIssue::new(
                    "rss.channel.link",
                    "must be a well-formed URL",
                ));
            }
        }

        if !issues.is_empty() {
            return Err(ValidationIssues(issues));
        }

        let total = channel.item.len();
        let items: Vec<FeedItem> = channel.item.into_iter().filter_map(complete_item).collect();
        let dropped = total - items.len();

        Ok(NormalizeResult {
            document: NormalizedFeedDocument {
                // require_text recorded an issue for every None, and we
                // returned above when issues was non-empty, so the defaults
                // below are unreachable.
                title: title.unwrap_or_default(),
                link: link.unwrap_or_default(),
                description: description.unwrap_or_default(),
                items,
            },
            dropped,
        })
    }
}

fn require_text(
    issues: &mut Vec<ValidationIssue>,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    match value {
        Some(text) if !text.is_empty() => Some(text),
        Some(_) => {
            issues.push(ValidationIssue::new(field, "must not be empty"));
            None
        }
        None => {
            issues.push(ValidationIssue::new(field, "required element is missing"));
            None
        }
    }
}

/// Keeps an item only when all four required fields are present and non-empty.
fn complete_item(item: RawItem) -> Option<FeedItem> {
    match (item.title, item.link, item.description, item.pub_date) {
        (Some(title), Some(link), Some(description), Some(pub_date))
            if !title.is_empty()
                && !link.is_empty()
                && !description.is_empty()
                && !pub_date.is_empty() =>
        {
            Some(FeedItem {
                title,
                link,
                description,
                pub_date,
            })
        }
        _ => None,
    }
}
