use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use crate::{
    domain::{
        record::{
            CompanyRecord, Education, Experience, ExtractedRecord, FeedPost, PostComment,
            PostRecord, ProfileRecord,
        },
        scrape::{FieldError, PageKind},
    },
    services::fetcher::RenderedPage,
};

const RECENT_POST_LIMIT: usize = 3;
const COMMENT_LIMIT: usize = 5;

/// Where each expected field lives on the rendered page. Declarative
/// configuration so a markup change on the source site is a config edit,
/// not a code change. Defaults match the site's current class names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorTable {
    pub company_name: String,
    pub company_industry: String,
    pub company_detail_item: String,
    pub company_detail_label: String,
    pub company_detail_value: String,
    pub company_about: String,
    pub company_feed_post: String,
    pub feed_post_text: String,
    pub social_count_item: String,
    pub profile_name: String,
    pub profile_headline: String,
    pub profile_location: String,
    pub profile_connections: String,
    pub profile_about: String,
    pub profile_experience_item: String,
    pub profile_education_item: String,
    pub profile_item_title: String,
    pub profile_item_detail: String,
    pub post_author: String,
    pub post_author_headline: String,
    pub post_timestamp: String,
    pub post_content: String,
    pub post_comment_item: String,
    pub post_comment_author: String,
    pub post_comment_text: String,
}

impl Default for SelectorTable {
    fn default() -> Self {
        SelectorTable {
            company_name: ".org-top-card-summary__title".into(),
            company_industry: ".org-top-card-summary-info-list__info-item".into(),
            company_detail_item: ".org-about-company-module__about-us-item".into(),
            company_detail_label: ".org-about-company-module__about-us-label".into(),
            company_detail_value: ".org-about-company-module__about-us-text".into(),
            company_about: ".org-about-us-organization-description__text".into(),
            company_feed_post: ".occludable-update".into(),
            feed_post_text: ".feed-shared-update-v2__description".into(),
            social_count_item: ".social-details-social-counts__item".into(),
            profile_name: ".text-heading-xlarge".into(),
            profile_headline: ".text-body-medium".into(),
            profile_location: ".pv-text-details__left-panel .text-body-small".into(),
            profile_connections: ".pv-text-details__right-panel .text-body-small".into(),
            profile_about: "#about + div span".into(),
            profile_experience_item: "#experience + div li".into(),
            profile_education_item: "#education + div li".into(),
            profile_item_title: ".t-bold".into(),
            profile_item_detail: ".t-normal".into(),
            post_author: ".feed-shared-actor__name".into(),
            post_author_headline: ".feed-shared-actor__description".into(),
            post_timestamp: ".feed-shared-actor__sub-description".into(),
            post_content: ".feed-shared-update-v2__description".into(),
            post_comment_item: ".comments-comment-item".into(),
            post_comment_author: ".comments-post-meta__name-text".into(),
            post_comment_text: ".comments-comment-item__main-content".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid selector for {field}: {reason}")]
pub struct SelectorTableError {
    pub field: &'static str,
    pub reason: String,
}

#[derive(Debug)]
struct CompiledSelectors {
    company_name: Selector,
    company_industry: Selector,
    company_detail_item: Selector,
    company_detail_label: Selector,
    company_detail_value: Selector,
    company_about: Selector,
    company_feed_post: Selector,
    feed_post_text: Selector,
    social_count_item: Selector,
    profile_name: Selector,
    profile_headline: Selector,
    profile_location: Selector,
    profile_connections: Selector,
    profile_about: Selector,
    profile_experience_item: Selector,
    profile_education_item: Selector,
    profile_item_title: Selector,
    profile_item_detail: Selector,
    post_author: Selector,
    post_author_headline: Selector,
    post_timestamp: Selector,
    post_content: Selector,
    post_comment_item: Selector,
    post_comment_author: Selector,
    post_comment_text: Selector,
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, SelectorTableError> {
    Selector::parse(selector).map_err(|e| SelectorTableError {
        field,
        reason: e.to_string(),
    })
}

/// Interprets a rendered page into one of the three record shapes.
///
/// Every field is attempted independently. A field missing from the page
/// yields its default value plus one entry in the returned error list and
/// never stops the sibling fields from being read. The caller decides what
/// a non-empty error list means; this type only reports what it saw.
#[derive(Debug)]
pub struct Extractor {
    selectors: CompiledSelectors,
}

impl Extractor {
    pub fn new(table: &SelectorTable) -> Result<Self, SelectorTableError> {
        let selectors = CompiledSelectors {
            company_name: compile("company_name", &table.company_name)?,
            company_industry: compile("company_industry", &table.company_industry)?,
            company_detail_item: compile("company_detail_item", &table.company_detail_item)?,
            company_detail_label: compile("company_detail_label", &table.company_detail_label)?,
            company_detail_value: compile("company_detail_value", &table.company_detail_value)?,
            company_about: compile("company_about", &table.company_about)?,
            company_feed_post: compile("company_feed_post", &table.company_feed_post)?,
            feed_post_text: compile("feed_post_text", &table.feed_post_text)?,
            social_count_item: compile("social_count_item", &table.social_count_item)?,
            profile_name: compile("profile_name", &table.profile_name)?,
            profile_headline: compile("profile_headline", &table.profile_headline)?,
            profile_location: compile("profile_location", &table.profile_location)?,
            profile_connections: compile("profile_connections", &table.profile_connections)?,
            profile_about: compile("profile_about", &table.profile_about)?,
            profile_experience_item: compile(
                "profile_experience_item",
                &table.profile_experience_item,
            )?,
            profile_education_item: compile(
                "profile_education_item",
                &table.profile_education_item,
            )?,
            profile_item_title: compile("profile_item_title", &table.profile_item_title)?,
            profile_item_detail: compile("profile_item_detail", &table.profile_item_detail)?,
            post_author: compile("post_author", &table.post_author)?,
            post_author_headline: compile("post_author_headline", &table.post_author_headline)?,
            post_timestamp: compile("post_timestamp", &table.post_timestamp)?,
            post_content: compile("post_content", &table.post_content)?,
            post_comment_item: compile("post_comment_item", &table.post_comment_item)?,
            post_comment_author: compile("post_comment_author", &table.post_comment_author)?,
            post_comment_text: compile("post_comment_text", &table.post_comment_text)?,
        };
        Ok(Extractor { selectors })
    }

    pub fn extract(
        &self,
        page: &RenderedPage,
        kind: PageKind,
    ) -> (ExtractedRecord, Vec<FieldError>) {
        let doc = Html::parse_document(page.html());
        match kind {
            PageKind::Company => {
                let (record, errors) = self.company(&doc);
                (ExtractedRecord::Company(record), errors)
            }
            PageKind::Profile => {
                let (record, errors) = self.profile(&doc);
                (ExtractedRecord::Profile(record), errors)
            }
            PageKind::Post => {
                let (record, errors) = self.post(&doc);
                (ExtractedRecord::Post(record), errors)
            }
        }
    }

    fn company(&self, doc: &Html) -> (CompanyRecord, Vec<FieldError>) {
        let s = &self.selectors;
        let mut errors = vec![];

        let name = take(first_text(doc, &s.company_name), "name", &mut errors);
        let industry = take(first_text(doc, &s.company_industry), "industry", &mut errors);

        let mut website = None;
        let mut company_size = None;
        let mut headquarters = None;
        let mut founded = None;
        let mut specialties: Option<Vec<String>> = None;

        for item in doc.select(&s.company_detail_item) {
            let Some(label) = first_text_in(item, &s.company_detail_label) else {
                continue;
            };
            let value = first_text_in(item, &s.company_detail_value);
            let label = label.to_lowercase();

            if label.contains("website") {
                website = value;
            } else if label.contains("size") {
                company_size = value;
            } else if label.contains("headquarters") {
                headquarters = value;
            } else if label.contains("founded") {
                founded = value;
            } else if label.contains("specialties") {
                specialties =
                    value.map(|v| v.split(',').map(|part| part.trim().to_string()).collect());
            }
        }

        let website = take(website, "website", &mut errors);
        let company_size = take(company_size, "company_size", &mut errors);
        let headquarters = take(headquarters, "headquarters", &mut errors);
        let founded = take(founded, "founded", &mut errors);
        let specialties = match specialties {
            Some(list) if !list.iter().all(|part| part.is_empty()) => list,
            Some(_) => {
                errors.push(FieldError::parse_failure("specialties"));
                vec![]
            }
            None => {
                errors.push(FieldError::not_found("specialties"));
                vec![]
            }
        };
        let about = take(first_text(doc, &s.company_about), "about", &mut errors);

        let mut recent_posts = vec![];
        let mut malformed_post = false;
        for post in doc.select(&s.company_feed_post).take(RECENT_POST_LIMIT) {
            let Some(text) = first_text_in(post, &s.feed_post_text) else {
                malformed_post = true;
                continue;
            };
            let (likes, comments, _) = social_counts(post, &s.social_count_item);
            recent_posts.push(FeedPost {
                text,
                likes,
                comments,
            });
        }
        if recent_posts.is_empty() {
            errors.push(match malformed_post {
                true => FieldError::parse_failure("recent_posts"),
                false => FieldError::not_found("recent_posts"),
            });
        }

        let record = CompanyRecord {
            name,
            industry,
            website,
            company_size,
            headquarters,
            founded,
            specialties,
            about,
            recent_posts,
        };
        (record, errors)
    }

    fn profile(&self, doc: &Html) -> (ProfileRecord, Vec<FieldError>) {
        let s = &self.selectors;
        let mut errors = vec![];

        let name = take(first_text(doc, &s.profile_name), "name", &mut errors);
        let headline = take(first_text(doc, &s.profile_headline), "headline", &mut errors);
        let location = take(first_text(doc, &s.profile_location), "location", &mut errors);
        let connections = take(
            first_text(doc, &s.profile_connections),
            "connections",
            &mut errors,
        );
        let about = take(first_text(doc, &s.profile_about), "about", &mut errors);

        let experience = self.history_items(doc, &s.profile_experience_item, |title, details| {
            Experience {
                title,
                company: details.first().cloned().unwrap_or_default(),
                duration: details.get(1).cloned().unwrap_or_default(),
            }
        });
        let experience = take_list(experience, "experience", &mut errors);

        let education = self.history_items(doc, &s.profile_education_item, |school, details| {
            Education {
                school,
                degree: details.first().cloned().unwrap_or_default(),
                years: details.get(1).cloned().unwrap_or_default(),
            }
        });
        let education = take_list(education, "education", &mut errors);

        let record = ProfileRecord {
            name,
            headline,
            location,
            connections,
            about,
            experience,
            education,
        };
        (record, errors)
    }

    /// Experience and education share one item shape: a bold title line
    /// followed by detail lines.
    fn history_items<T>(
        &self,
        doc: &Html,
        item_selector: &Selector,
        build: impl Fn(String, Vec<String>) -> T,
    ) -> Vec<T> {
        let s = &self.selectors;
        doc.select(item_selector)
            .filter_map(|item| {
                let title = first_text_in(item, &s.profile_item_title)?;
                let details: Vec<String> = item
                    .select(&s.profile_item_detail)
                    .filter_map(non_empty_text)
                    .collect();
                Some(build(title, details))
            })
            .collect()
    }

    fn post(&self, doc: &Html) -> (PostRecord, Vec<FieldError>) {
        let s = &self.selectors;
        let mut errors = vec![];

        let author = take(first_text(doc, &s.post_author), "author", &mut errors);
        let author_headline = take(
            first_text(doc, &s.post_author_headline),
            "author_headline",
            &mut errors,
        );
        let content = take(first_text(doc, &s.post_content), "content", &mut errors);
        let timestamp = take(first_text(doc, &s.post_timestamp), "timestamp", &mut errors);

        let (likes, comments, reposts) = document_social_counts(doc, &s.social_count_item);
        let likes = take(likes, "likes", &mut errors);
        let comments = take(comments, "comments", &mut errors);
        let reposts = take(reposts, "reposts", &mut errors);

        let mut comments_list = vec![];
        let mut malformed_comment = false;
        for comment in doc.select(&s.post_comment_item).take(COMMENT_LIMIT) {
            let author = first_text_in(comment, &s.post_comment_author);
            let text = first_text_in(comment, &s.post_comment_text);
            match (author, text) {
                (Some(author), Some(text)) => comments_list.push(PostComment { author, text }),
                _ => malformed_comment = true,
            }
        }
        if comments_list.is_empty() {
            errors.push(match malformed_comment {
                true => FieldError::parse_failure("comments_list"),
                false => FieldError::not_found("comments_list"),
            });
        }

        let record = PostRecord {
            author,
            author_headline,
            content,
            timestamp,
            likes,
            comments,
            reposts,
            comments_list,
        };
        (record, errors)
    }
}

fn take(value: Option<String>, field: &str, errors: &mut Vec<FieldError>) -> String {
    match value {
        Some(v) => v,
        None => {
            errors.push(FieldError::not_found(field));
            String::new()
        }
    }
}

fn take_list<T>(items: Vec<T>, field: &str, errors: &mut Vec<FieldError>) -> Vec<T> {
    if items.is_empty() {
        errors.push(FieldError::not_found(field));
    }
    items
}

/// Engagement counters carry their unit in the text ("1.2K likes"), so the
/// unit word is also how each counter is told apart.
fn classify_counts<'a>(
    items: impl Iterator<Item = ElementRef<'a>>,
) -> (Option<String>, Option<String>, Option<String>) {
    let mut likes = None;
    let mut comments = None;
    let mut reposts = None;
    for item in items {
        let Some(text) = non_empty_text(item) else {
            continue;
        };
        let lowered = text.to_lowercase();
        if lowered.contains("like") {
            likes = Some(text);
        } else if lowered.contains("comment") {
            comments = Some(text);
        } else if lowered.contains("repost") {
            reposts = Some(text);
        }
    }
    (likes, comments, reposts)
}

fn social_counts(
    element: ElementRef<'_>,
    selector: &Selector,
) -> (Option<String>, Option<String>, Option<String>) {
    classify_counts(element.select(selector))
}

fn document_social_counts(
    doc: &Html,
    selector: &Selector,
) -> (Option<String>, Option<String>, Option<String>) {
    classify_counts(doc.select(selector))
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector).next().and_then(non_empty_text)
}

fn first_text_in(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element.select(selector).next().and_then(non_empty_text)
}

fn non_empty_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}
