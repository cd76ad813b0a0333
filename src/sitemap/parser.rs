//! Streaming sitemap parser
//!
//! A forward-only pass over a sitemap document. `<urlset>` entries are
//! handed to the visitor as they close; `<sitemapindex>` locations are handed
//! over as soon as their `<loc>` text is complete, so the caller can resolve
//! them depth-first before parsing continues. No document tree is ever
//! built: sitemaps routinely list tens of thousands of URLs.
//!
//! # Events
//!
//! | Event | Condition | Action |
//! |-------|-----------|--------|
//! | start `sitemap` | | enter index mode |
//! | end `sitemap` | | leave index mode |
//! | start `url` | | open a new entry, dropping any unfinished one |
//! | start `loc`/`lastmod`/`changefreq`/`priority` | | await that field's text |
//! | text | index mode, awaiting `loc` | report a child sitemap |
//! | text | entry open | fill the awaited field |
//! | end `url` | entry has a reference | scope check, then emit |
//!
//! Tag names match case-insensitively on their local part. Text and CDATA
//! fragments are joined and trimmed before they are dispatched.

use crate::sitemap::entry::{parse_lastmod, parse_priority, PendingEntry, SitemapEntry};
use crate::sitemap::guard::StopSignal;
use crate::url::ScopeFilter;
use quick_xml::errors::IllFormedError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::BufRead;

/// Receives what the parser finds in one sitemap document
pub trait SitemapVisitor {
    /// A `<sitemap><loc>` of a sitemap index
    ///
    /// Called synchronously; parsing resumes when this returns.
    fn child_sitemap(&mut self, location: &str);

    /// A complete `<url>` entry that passed the scope check
    fn entry(&mut self, entry: SitemapEntry);
}

/// How a parse ended, when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole document was read
    Completed,
    /// The stop signal was raised before the end of the document
    Stopped,
}

/// Counters for one parsed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSummary {
    pub outcome: ParseOutcome,
    pub emitted: usize,
    pub out_of_scope: usize,
    pub child_sitemaps: usize,
}

/// Leaf field whose text is awaited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    LastMod,
    ChangeFreq,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Sitemap,
    Url,
    Field(Field),
    Other,
}

impl Tag {
    fn classify(local_name: &[u8]) -> Self {
        let is = |name: &str| local_name.eq_ignore_ascii_case(name.as_bytes());
        if is("sitemap") {
            Self::Sitemap
        } else if is("url") {
            Self::Url
        } else if is("loc") {
            Self::Field(Field::Loc)
        } else if is("lastmod") {
            Self::Field(Field::LastMod)
        } else if is("changefreq") {
            Self::Field(Field::ChangeFreq)
        } else if is("priority") {
            Self::Field(Field::Priority)
        } else {
            Self::Other
        }
    }
}

struct ParseState<'a> {
    location: &'a str,
    scope: ScopeFilter,
    in_index: bool,
    awaiting: Option<Field>,
    entry: Option<PendingEntry>,
    text: String,
    emitted: usize,
    out_of_scope: usize,
    child_sitemaps: usize,
}

impl<'a> ParseState<'a> {
    fn new(location: &'a str, scope: ScopeFilter) -> Self {
        Self {
            location,
            scope,
            in_index: false,
            awaiting: None,
            entry: None,
            text: String::new(),
            emitted: 0,
            out_of_scope: 0,
            child_sitemaps: 0,
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Sitemap => self.in_index = true,
            Tag::Url => self.entry = Some(PendingEntry::default()),
            Tag::Field(field) => self.awaiting = Some(field),
            Tag::Other => {}
        }
    }

    fn end(&mut self, tag: Tag, visitor: &mut dyn SitemapVisitor) {
        match tag {
            Tag::Sitemap => self.in_index = false,
            Tag::Url => self.close_entry(visitor),
            Tag::Field(_) => self.awaiting = None,
            Tag::Other => {}
        }
    }

    fn close_entry(&mut self, visitor: &mut dyn SitemapVisitor) {
        let Some(entry) = self.entry.take().and_then(PendingEntry::finish) else {
            return;
        };

        if self.scope.passes(&entry.reference, self.location) {
            self.emitted += 1;
            visitor.entry(entry);
        } else {
            self.out_of_scope += 1;
        }
    }

    /// Dispatches the text gathered since the last marker
    fn flush_text(&mut self, visitor: &mut dyn SitemapVisitor) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let value = text.trim();
        if value.is_empty() {
            return;
        }
        let Some(field) = self.awaiting else {
            return;
        };

        if self.in_index && field == Field::Loc {
            self.awaiting = None;
            self.child_sitemaps += 1;
            visitor.child_sitemap(value);
            return;
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        self.awaiting = None;

        match field {
            Field::Loc => entry.reference = Some(value.to_string()),
            Field::LastMod => match parse_lastmod(value) {
                Some(ts) => entry.last_modified = Some(ts),
                None => tracing::info!("Invalid sitemap date: {}", value),
            },
            Field::ChangeFreq => entry.change_frequency = Some(value.to_string()),
            Field::Priority => match parse_priority(value) {
                Some(p) => entry.priority = Some(p),
                None => tracing::info!("Invalid sitemap priority: {}", value),
            },
        }
    }

    fn summary(&self, outcome: ParseOutcome) -> ParseSummary {
        ParseSummary {
            outcome,
            emitted: self.emitted,
            out_of_scope: self.out_of_scope,
            child_sitemaps: self.child_sitemaps,
        }
    }
}

/// Parses one sitemap document read from `input`
///
/// `location` is where the document was fetched from; it scopes the entries
/// the document may emit. The stop signal is checked before every event.
///
/// # Errors
///
/// Returns the XML error that ended the parse. A document that ends with
/// elements still open fails with `IllFormedError::MissingEndTag`.
/// Everything reported to the visitor before the error stands.
pub fn parse_sitemap<R: BufRead>(
    input: R,
    location: &str,
    scope: ScopeFilter,
    stop: &dyn StopSignal,
    visitor: &mut dyn SitemapVisitor,
) -> Result<ParseSummary, quick_xml::Error> {
    let mut reader = Reader::from_reader(input);
    let mut state = ParseState::new(location, scope);
    let mut buf = Vec::new();
    let mut open: Vec<String> = Vec::new();

    loop {
        if stop.is_stop_requested() {
            tracing::debug!(
                "Sitemap not entirely parsed due to crawler being stopped: {}",
                location
            );
            return Ok(state.summary(ParseOutcome::Stopped));
        }

        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                state.flush_text(visitor);
                open.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                state.start(Tag::classify(e.local_name().as_ref()));
            }
            Event::Empty(e) => {
                state.flush_text(visitor);
                let tag = Tag::classify(e.local_name().as_ref());
                state.start(tag);
                state.end(tag, visitor);
            }
            Event::End(e) => {
                state.flush_text(visitor);
                open.pop();
                state.end(Tag::classify(e.local_name().as_ref()), visitor);
            }
            Event::Text(e) => state.text.push_str(&e.unescape()?),
            Event::CData(e) => state
                .text
                .push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => {
                // quick-xml reports EOF even when elements are still open
                if let Some(name) = open.pop() {
                    return Err(quick_xml::Error::IllFormed(
                        IllFormedError::MissingEndTag(name),
                    ));
                }
                state.flush_text(visitor);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(state.summary(ParseOutcome::Completed))
}
