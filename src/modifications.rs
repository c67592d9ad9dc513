//! Counting customisation options against a controlled vocabulary.
//!
//! A modifications table lists one option per row; a category cell spans the
//! rows of its options, so its `rowspan` is the number of options.

use crate::dom::{closest, element_text, has_previous_element_sibling, selector};
use scraper::{ElementRef, Html};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use Term::{Flat, Strict};
use VocabularyEntry::{Group, Term as Single};

pub const TOTAL_KEY: &str = "total";
pub const THEORETICAL_TOTAL_KEY: &str = "theoretical total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    /// Case-insensitive prefix match.
    Flat(&'static str),
    /// Case-insensitive whole-cell match.
    Strict(&'static str),
}

impl Term {
    pub fn label(self) -> &'static str {
        match self {
            Term::Flat(label) | Term::Strict(label) => label,
        }
    }

    pub fn matches(self, cell_text: &str) -> bool {
        let text = cell_text.trim().to_lowercase();
        match self {
            Term::Flat(label) => text.starts_with(&label.to_lowercase()),
            Term::Strict(label) => text == label.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyEntry {
    Term(Term),
    /// The first member leads the group. When the lead is present its count
    /// covers the whole group; otherwise every member counts on its own.
    Group(&'static [Term]),
}

pub const VEHICLE_MODIFICATIONS: &[VocabularyEntry] = &[
    Single(Strict("armor")),
    Group(&[
        Flat("bodywork"),
        Flat("armor plating"),
        Flat("blades"),
        Flat("rear wheel cover"),
        Flat("roll cage"),
        Flat("spikes"),
    ]),
    Single(Flat("boost")),
    Single(Flat("brakes")),
    Group(&[Strict("bumpers"), Flat("front bumpers"), Flat("rear bumpers")]),
    Single(Flat("cam cover")),
    Single(Flat("canards")),
    Single(Flat("chassis")),
    Single(Flat("drift tuning")),
    Single(Strict("engine")),
    Single(Flat("engine block")),
    Single(Flat("engine covers")),
    Single(Flat("exhaust")),
    Single(Flat("explosives")),
    Single(Flat("fenders")),
    Single(Flat("fog lights")),
    Single(Flat("grille")),
    Single(Flat("headlight covers")),
    Single(Flat("hood catches")),
    Single(Flat("hood")),
    Single(Flat("horn")),
    Single(Flat("hsw upgrade")),
    Single(Flat("imani")),
    Group(&[
        Flat("interior"),
        Flat("dash"),
        Flat("dial design"),
        Flat("doors"),
        Flat("roll cage"),
        Flat("seats"),
        Flat("steering wheel"),
        Flat("trim design"),
    ]),
    Single(Flat("lights")),
    Single(Flat("livery")),
    Single(Flat("loss/theft prevention")),
    Single(Flat("mirrors")),
    Single(Flat("mudguards")),
    Single(Flat("name")),
    Single(Flat("plateholders")),
    Single(Flat("plates")),
    Single(Flat("rear panel")),
    Single(Flat("rear windshield")),
    Single(Flat("respray")),
    Single(Flat("roof accessories")),
    Single(Flat("roof")),
    Single(Flat("sell")),
    Single(Flat("side panel")),
    Single(Flat("skirts")),
    Single(Flat("spoiler")),
    Single(Flat("strut braces")),
    Single(Flat("sunstrip")),
    Single(Flat("suspension")),
    Single(Flat("transmission")),
    Single(Strict("trim")),
    Single(Flat("trunks")),
    Single(Flat("turbo")),
    Single(Flat("upgrade")),
    Single(Flat("vertical jump")),
    Group(&[Flat("weapons"), Flat("mine")]),
    Single(Strict("wheels")),
    Single(Flat("wind deflectors")),
    Single(Flat("windows")),
];

/// Per-item result. Terms that were not found are absent from `counts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Modifications {
    pub counts: BTreeMap<String, u32>,
    pub total: u32,
    /// Rows in the table minus its header row; informational only.
    pub theoretical_total: u32,
}

impl Modifications {
    pub fn get(&self, label: &str) -> Option<u32> {
        self.counts.get(label).copied()
    }

    pub fn to_map(&self) -> BTreeMap<String, u32> {
        let mut map = self.counts.clone();
        map.insert(TOTAL_KEY.to_string(), self.total);
        map.insert(THEORETICAL_TOTAL_KEY.to_string(), self.theoretical_total);
        map
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_map()).unwrap_or_default()
    }
}

/// Returns `None` when the page has no modifications table at all, which is
/// different from a table in which nothing matched.
pub fn count_modifications(doc: &Html, vocabulary: &[VocabularyEntry]) -> Option<Modifications> {
    let Some(header) = doc
        .select(&selector("th"))
        .find(|th| element_text(*th).to_lowercase().contains("modification"))
    else {
        debug!("no modifications header");
        return None;
    };

    let scope = closest(header, "tbody").or_else(|| closest(header, "table"))?;
    let rows = scope.select(&selector("tr")).count();
    let anchors: Vec<(String, ElementRef<'_>)> = scope
        .select(&selector("td"))
        .filter(|cell| !has_previous_element_sibling(*cell))
        .map(|cell| (element_text(cell), cell))
        .collect();

    let mut result = Modifications {
        theoretical_total: rows.saturating_sub(1) as u32,
        ..Modifications::default()
    };

    for entry in vocabulary {
        match entry {
            VocabularyEntry::Term(term) => {
                let count = count_term(&anchors, *term);
                if count > 0 {
                    result.counts.insert(term.label().to_string(), count);
                    result.total += count;
                }
            }
            VocabularyEntry::Group(members) => {
                let mut lead_present = false;
                for (index, term) in members.iter().enumerate() {
                    let count = count_term(&anchors, *term);
                    if count == 0 {
                        continue;
                    }
                    result.counts.insert(term.label().to_string(), count);
                    if !lead_present {
                        result.total += count;
                    }
                    if index == 0 {
                        lead_present = true;
                    }
                }
            }
        }
    }

    debug!(
        total = result.total,
        theoretical = result.theoretical_total,
        "modifications counted"
    );
    Some(result)
}

/// Options under the first category cell matching `term`. Only cells that
/// open their row are candidates, so rows continuing a spanned cell never
/// count twice. A cell without `rowspan` is one option.
fn count_term(anchors: &[(String, ElementRef<'_>)], term: Term) -> u32 {
    anchors
        .iter()
        .find(|(text, _)| term.matches(text))
        .map(|(_, cell)| {
            cell.value()
                .attr("rowspan")
                .and_then(|span| span.trim().parse::<u32>().ok())
                .unwrap_or(1)
        })
        .unwrap_or(0)
}
