//! Last-resort structural heuristics against the rendered profile layout.
//!
//! Layouts drift, so every field carries a list of known selectors tried in
//! order. See [`MarkupRules::default`] for the shipped tables.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::parse_count;
use crate::parser::merge::Evidence;
use crate::parser::selector::{first_match, select_items, visible_text, FieldSelector, Read};
use crate::record::{Education, Experience};

static DEFAULT_RULES: LazyLock<MarkupRules> = LazyLock::new(MarkupRules::default);

/// Repeated entries (education, experience): container selectors plus three
/// per-item sub-field selector lists.
#[derive(Debug)]
pub struct ItemRules {
    pub items: Vec<FieldSelector>,
    pub fields: [Vec<FieldSelector>; 3],
}

#[derive(Debug)]
pub struct MarkupRules {
    pub full_name: Vec<FieldSelector>,
    pub headline: Vec<FieldSelector>,
    pub about: Vec<FieldSelector>,
    pub location: Vec<FieldSelector>,
    pub profile_picture: Vec<FieldSelector>,
    pub followers: Vec<FieldSelector>,
    /// Sub-fields: institution, degree, year.
    pub education: ItemRules,
    /// Sub-fields: company, role, duration.
    pub experience: ItemRules,
    pub skills: Vec<FieldSelector>,
}

impl Default for MarkupRules {
    fn default() -> Self {
        use FieldSelector as S;

        MarkupRules {
            full_name: vec![
                S::text("h1"),
                S::text(".pv-text-details__left-panel h1"),
                S::text(".text-heading-xlarge"),
                S::attribute("h1", "class", "top-card-layout__title", Read::Text),
            ],
            headline: vec![
                S::text(".pv-text-details__left-panel .text-body-medium"),
                S::text(".text-body-medium"),
                S::attribute("h2", "class", "top-card-layout__headline", Read::Text),
            ],
            about: vec![
                S::text("#about ~ div .pv-shared-text-with-see-more .visually-hidden"),
                S::text("section#about p"),
                S::attribute("section", "data-section", "summary", Read::Text),
            ],
            location: vec![
                S::text(".pv-text-details__left-panel .text-body-small.inline"),
                S::text(".top-card__subline-item"),
            ],
            profile_picture: vec![
                S::path("img.pv-top-card-profile-picture__image", Read::Attr("src")),
                S::path("img.pv-top-card-profile-picture__image--show", Read::Attr("src")),
                S::attribute("img", "class", "top-card__profile-image", Read::Attr("src")),
                S::attribute("img", "class", "top-card__profile-image", Read::Attr("data-delayed-url")),
            ],
            followers: vec![S::pattern(
                Regex::new(r"(?i)(followers|connections)").unwrap(),
                Regex::new(r"(\d[\d,.]*)").unwrap(),
            )],
            education: ItemRules {
                items: vec![
                    S::text("section#education ~ ul li"),
                    S::text("section.pv-profile-section.education-section li"),
                    S::text("section.education li.education__list-item"),
                ],
                fields: [
                    vec![
                        S::text(".pv-entity__school-name"),
                        S::text(".t-16.t-black.t-bold"),
                        S::text("h3"),
                    ],
                    vec![
                        S::text(".pv-entity__degree-name .pv-entity__comma-item"),
                        S::text(".t-14.t-black.t-normal"),
                        S::text("h4"),
                    ],
                    vec![
                        S::text(".pv-entity__dates time"),
                        S::text(".pv-entity__date-range span:nth-of-type(2)"),
                        S::text(".date-range"),
                    ],
                ],
            },
            experience: ItemRules {
                items: vec![
                    S::text("section#experience ~ ul li"),
                    S::text("section.pv-profile-section.experience-section li"),
                    S::text("section.experience li.experience-item"),
                ],
                fields: [
                    vec![
                        S::text(".pv-entity__secondary-title"),
                        S::text(".t-14.t-black.t-normal"),
                        S::text(".experience-item__subtitle"),
                    ],
                    vec![
                        S::text(".t-16.t-black.t-bold"),
                        S::text(".pv-entity__summary-info h3"),
                        S::text(".experience-item__title"),
                    ],
                    vec![
                        S::text(".pv-entity__bullet-item-v2"),
                        S::text(".pv-entity__date-range span:nth-of-type(2)"),
                        S::text(".date-range"),
                    ],
                ],
            },
            skills: vec![
                S::text("span.pv-skill-category-entity__name-text"),
                S::text(".pv2 .t-14.t-black.t-bold"),
                S::text("li.skills__item"),
            ],
        }
    }
}

pub fn extract(doc: &Html) -> Evidence {
    extract_with(doc, &DEFAULT_RULES)
}

pub fn extract_with(doc: &Html, rules: &MarkupRules) -> Evidence {
    let root = doc.root_element();

    Evidence {
        full_name: first_match(&rules.full_name, root),
        headline: first_match(&rules.headline, root),
        about: first_match(&rules.about, root),
        location: first_match(&rules.location, root),
        profile_picture: first_match(&rules.profile_picture, root),
        followers: followers(&rules.followers, root),
        education: items(&rules.education, root)
            .map(|[institution, degree, year]| Education {
                degree,
                institution,
                year,
            })
            .collect(),
        experience: items(&rules.experience, root)
            .map(|[company, role, duration]| Experience {
                company,
                role,
                duration,
            })
            .collect(),
        skills: skills(&rules.skills, root),
    }
}

fn followers(selectors: &[FieldSelector], root: ElementRef<'_>) -> Option<u64> {
    let raw = first_match(selectors, root)?;
    match parse_count(&raw) {
        Ok(n) => Some(n),
        Err(e) => {
            debug!("ignoring follower count in markup: {}", e);
            None
        }
    }
}

/// Sub-field triples for every repeated item with at least one resolved
/// sub-field.
fn items<'a>(
    rules: &'a ItemRules,
    root: ElementRef<'a>,
) -> impl Iterator<Item = [Option<String>; 3]> + 'a {
    select_items(&rules.items, root)
        .into_iter()
        .map(|item| rules.fields.each_ref().map(|sel| first_match(sel, item)))
        .filter(|fields| fields.iter().any(Option::is_some))
}

fn skills(selectors: &[FieldSelector], root: ElementRef<'_>) -> Vec<String> {
    select_items(selectors, root)
        .into_iter()
        .map(visible_text)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("skills"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(body: &str) -> Evidence {
        extract(&Html::parse_document(body))
    }

    #[test]
    fn name_whitespace_survives_until_normalization() {
        let ev = run("<body><h1>  John   Smith \n</h1></body>");
        assert_eq!(ev.full_name.as_deref(), Some("John   Smith"));
    }

    #[test]
    fn top_card_fields() {
        let ev = run(r#"
            <div class="pv-text-details__left-panel">
              <h1>Jane Doe</h1>
              <div class="text-body-medium">Staff <b>Engineer</b></div>
              <span class="text-body-small inline">Lisbon, Portugal</span>
            </div>
            <img class="pv-top-card-profile-picture__image" src="https://cdn.example.com/jd.jpg">
            <section id="about"><p>Builds   things.</p></section>
            <ul><li><span>1.204</span> followers</li></ul>
        "#);
        assert_eq!(ev.full_name.as_deref(), Some("Jane Doe"));
        assert_eq!(ev.headline.as_deref(), Some("Staff Engineer"));
        assert_eq!(ev.location.as_deref(), Some("Lisbon, Portugal"));
        assert_eq!(ev.profile_picture.as_deref(), Some("https://cdn.example.com/jd.jpg"));
        assert_eq!(ev.about.as_deref(), Some("Builds   things."));
        assert_eq!(ev.followers, Some(1204));
    }

    #[test]
    fn followers_absent_without_number() {
        let ev = run("<p>Many followers</p>");
        assert_eq!(ev.followers, None);
    }

    #[test]
    fn education_items_need_a_field() {
        let ev = run(r#"
            <section class="pv-profile-section education-section"><ul>
              <li><h3 class="pv-entity__school-name">MIT</h3>
                  <p class="pv-entity__degree-name"><span class="pv-entity__comma-item">BSc</span></p>
                  <p class="pv-entity__dates"><time>2010</time> – <time>2014</time></p></li>
              <li><div class="unrelated"></div></li>
              <li><span class="pv-entity__dates"><time>2016</time></span></li>
            </ul></section>
        "#);
        assert_eq!(ev.education.len(), 2);
        assert_eq!(ev.education[0].institution.as_deref(), Some("MIT"));
        assert_eq!(ev.education[0].degree.as_deref(), Some("BSc"));
        assert_eq!(ev.education[0].year.as_deref(), Some("2010"));
        assert_eq!(ev.education[1].institution, None);
        assert_eq!(ev.education[1].year.as_deref(), Some("2016"));
    }

    #[test]
    fn experience_items() {
        let ev = run(r#"
            <section id="experience"></section>
            <ul>
              <li><span class="t-16 t-black t-bold">Engineer</span>
                  <span class="t-14 t-black t-normal">Acme</span>
                  <span class="pv-entity__bullet-item-v2">2 yrs</span></li>
              <li><span class="t-14 t-black t-normal">Globex</span></li>
            </ul>
        "#);
        assert_eq!(ev.experience.len(), 2);
        assert_eq!(ev.experience[0].role.as_deref(), Some("Engineer"));
        assert_eq!(ev.experience[0].company.as_deref(), Some("Acme"));
        assert_eq!(ev.experience[0].duration.as_deref(), Some("2 yrs"));
        assert_eq!(ev.experience[1].role, None);
    }

    #[test]
    fn skills_skip_label_and_blanks() {
        let ev = run(r#"
            <span class="pv-skill-category-entity__name-text">Skills</span>
            <span class="pv-skill-category-entity__name-text"> Rust </span>
            <span class="pv-skill-category-entity__name-text"></span>
            <span class="pv-skill-category-entity__name-text">Rust</span>
        "#);
        assert_eq!(ev.skills, vec!["Rust".to_string(), "Rust".to_string()]);
    }

    #[test]
    fn mixed_layouts_on_one_page_are_combined() {
        let ev = run(r#"
            <section class="pv-profile-section education-section"><ul>
              <li><h3 class="pv-entity__school-name">MIT</h3></li>
            </ul></section>
            <section class="education"><ul>
              <li class="education__list-item"><h3>ETH Zürich</h3><h4>MSc</h4></li>
            </ul></section>
            <span class="pv-skill-category-entity__name-text">Rust</span>
            <div class="pv2"><span class="t-14 t-black t-bold">Go</span></div>
        "#);
        let schools: Vec<_> = ev.education.iter().map(|e| e.institution.as_deref()).collect();
        assert_eq!(schools, [Some("MIT"), Some("ETH Zürich")]);
        assert_eq!(ev.education[1].degree.as_deref(), Some("MSc"));
        assert_eq!(ev.skills, vec!["Rust".to_string(), "Go".to_string()]);
    }

    #[test]
    fn custom_rules() {
        let mut rules = MarkupRules::default();
        rules.full_name = vec![FieldSelector::text(".display-name")];
        let doc = Html::parse_document(r#"<h1>Wrong</h1><p class="display-name">Right</p>"#);
        assert_eq!(extract_with(&doc, &rules).full_name.as_deref(), Some("Right"));
    }

    #[test]
    fn nothing_matches() {
        assert!(run("<p>hello</p>").is_empty());
    }
}
