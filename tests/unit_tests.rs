use nasa_media::prelude::*;
use nasa_media::query::to_query_string;
use nasa_media::render::{ELLIPSIS, truncate_description};
use nasa_media::resolver::upgrade_scheme;
use nasa_media::types::{AssetLink, SearchQueryBuilder};
use nasa_media::{Error, MediaType};
use serde_json::json;
use std::collections::BTreeSet;

fn item(media_type: MediaType, nasa_id: &str, keywords: &[&str]) -> ResultItem {
    ResultItem {
        title: format!("Item {}", nasa_id),
        description: String::new(),
        media_type,
        preview_url: None,
        asset_links: vec![],
        manifest_href: format!("https://images-assets.nasa.gov/{}/collection.json", nasa_id),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        nasa_id: Some(nasa_id.to_string()),
        date_created: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_builder() {
        let query = SearchQueryBuilder::default()
            .text("apollo")
            .media_type(MediaFilter::Audio)
            .year_start(Some("1969".to_string()))
            .tags(vec!["moon".to_string(), "eva".to_string()])
            .build()
            .unwrap();

        assert_eq!(
            query.to_params(),
            vec![
                ("q", "apollo".to_string()),
                ("media_type", "audio".to_string()),
                ("year_start", "1969".to_string()),
                ("keywords", "moon,eva".to_string()),
            ]
        );
    }

    #[test]
    fn test_all_media_type_is_omitted() {
        let form = FormState::new("mars").media_type("all");
        let query = build_query(&form, ValidationPolicy::AnyField).unwrap();

        assert_eq!(query.to_params(), vec![("q", "mars".to_string())]);
    }

    #[test]
    fn test_blank_form_is_rejected_under_both_policies() {
        let blank = FormState::new("   ").media_type("all").tags(" , ");

        for policy in [ValidationPolicy::AnyField, ValidationPolicy::RequireText] {
            let result = build_query(&blank, policy);
            assert!(matches!(result, Err(Error::Validation(_))), "{:?}", policy);
        }
    }

    #[test]
    fn test_filters_without_text() {
        let form = FormState::default().media_type("video").year_start("2020");

        let query = build_query(&form, ValidationPolicy::AnyField).unwrap();
        assert_eq!(query.text, "");
        assert_eq!(query.media_type, MediaFilter::Video);

        assert!(build_query(&form, ValidationPolicy::RequireText).is_err());
    }

    #[test]
    fn test_query_string_round_trip() {
        let form = FormState::new("apollo 11")
            .media_type("video")
            .year_start("1969")
            .tags("moon,eva");
        let query = build_query(&form, ValidationPolicy::AnyField).unwrap();

        let restored = FormState::from_query_string(&format!("/?{}", to_query_string(&query)));
        assert_eq!(restored, form);
    }

    #[test]
    fn test_search_query_from_str() {
        let query: SearchQuery = "nebula".into();
        assert_eq!(query.text, "nebula");
        assert_eq!(query.media_type, MediaFilter::All);
        assert!(query.tags.is_empty());
    }

    #[test]
    fn test_truncation_budget() {
        let long = "x".repeat(1000);
        let shown = truncate_description(&long, 470);
        assert_eq!(shown, format!("{}{}", "x".repeat(470), ELLIPSIS));

        let short = "ten chars!";
        assert_eq!(truncate_description(short, 470), short);
    }

    #[test]
    fn test_scheme_upgrade() {
        assert_eq!(
            upgrade_scheme("http://example.com/a.mp4"),
            "https://example.com/a.mp4"
        );
    }

    #[test]
    fn test_largest_asset() {
        let mut image = item(MediaType::Image, "a", &[]);
        image.asset_links = vec![
            AssetLink {
                href: "thumb.jpg".to_string(),
                size: None,
                rel: Some("preview".to_string()),
            },
            AssetLink {
                href: "large.jpg".to_string(),
                size: Some(5_000),
                rel: Some("alternate".to_string()),
            },
            AssetLink {
                href: "medium.jpg".to_string(),
                size: Some(1_000),
                rel: Some("alternate".to_string()),
            },
        ];

        assert_eq!(image.largest_asset(), Some("large.jpg"));
        assert_eq!(item(MediaType::Image, "b", &[]).largest_asset(), None);
    }

    #[test]
    fn test_render_empty_page() {
        let outcome = render_page(&ResultPage::default(), &RenderOptions::default());
        assert!(matches!(outcome, RenderOutcome::NoResults));
        assert!(outcome.into_cards().is_empty());
    }

    #[test]
    fn test_render_fills_local_slots() {
        let page = ResultPage {
            items: vec![
                item(MediaType::Image, "img", &[]),
                item(MediaType::Audio, "aud", &[]),
                item(MediaType::Unknown, "unk", &[]),
            ],
            ..Default::default()
        };

        let cards = render_page(&page, &RenderOptions::default()).into_cards();
        assert_eq!(cards.len(), 3);
        assert!(matches!(cards[0].slot(), Some(MediaSlot::Image { .. })));
        assert!(!cards[0].needs_resolution());
        assert!(cards[1].slot().is_none());
        assert!(cards[1].needs_resolution());
        assert_eq!(cards[2].slot(), Some(&MediaSlot::Unavailable));
        assert!(!cards[2].needs_resolution());
    }

    #[test]
    fn test_placeholder_fallback_preview() {
        let page = ResultPage {
            items: vec![item(MediaType::Audio, "aud", &["Mars", "Rover"])],
            ..Default::default()
        };
        let options = RenderOptions {
            fallback_preview: "img/no-preview.png".to_string(),
            ..Default::default()
        };

        let cards = render_page(&page, &options).into_cards();
        let placeholder = cards[0].placeholder();
        assert_eq!(placeholder.preview_url, "img/no-preview.png");
        assert_eq!(placeholder.keyword_links.len(), 2);
        assert_eq!(placeholder.keyword_links[0].href, "?keywords=Mars");
    }

    #[test]
    fn test_card_slot_is_write_once() {
        let page = ResultPage {
            items: vec![item(MediaType::Audio, "aud", &[])],
            ..Default::default()
        };
        let cards = render_page(&page, &RenderOptions::default()).into_cards();

        assert!(cards[0].fill(MediaSlot::Audio {
            src: "https://a/first.mp3".to_string()
        }));
        assert!(!cards[0].fill(MediaSlot::Unavailable));
        assert_eq!(cards[0].resolved_media_url(), Some("https://a/first.mp3"));
    }

    #[test]
    fn test_result_extensions() {
        let items = vec![
            item(MediaType::Image, "a", &["Mars"]),
            item(MediaType::Video, "b", &["moon"]),
            item(MediaType::Image, "a", &["Mars"]),
        ];

        assert_eq!(items.clone().dedupe_by_id().len(), 2);
        assert_eq!(items.clone().filter_media(MediaType::Video).len(), 1);
        assert_eq!(items.with_keyword("mars").len(), 2);
    }

    #[test]
    fn test_next_page_view_update() {
        let page = ResultPage::from_json(json!({
            "collection": {
                "items": [],
                "links": [{"href": "https://images-api.nasa.gov/search?q=mars&page=2", "prompt": "Next", "rel": "next"}]
            }
        }))
        .unwrap();

        let update = nasa_media::pagination::next_page_action(&page).unwrap();
        assert_eq!(
            update,
            ViewUpdate::NextPage {
                heading: "More Results:".to_string(),
                prompt: "Next".to_string(),
                href: "https://images-api.nasa.gov/search?q=mars&page=2".to_string(),
            }
        );
    }

    #[test]
    fn test_keywords_are_a_set() {
        let page = ResultPage::from_json(json!({
            "collection": {"items": [{
                "href": "h",
                "data": [{"title": "T", "media_type": "image", "keywords": ["Mars", "Mars", " Rover "]}]
            }]}
        }))
        .unwrap();

        let expected: BTreeSet<String> = ["Mars", "Rover"].iter().map(|s| s.to_string()).collect();
        assert_eq!(page.items[0].keywords, expected);
    }

    #[test]
    fn test_error_handling() {
        assert_eq!(
            Error::from_status(404, "x").user_message(),
            "No results found. Please try again."
        );
        assert_eq!(
            Error::from_status(500, "x").user_message(),
            "Internal server error. Please try again."
        );
        assert_eq!(
            Error::from_status(418, "x").user_message(),
            "An error occurred. Please try again."
        );
        assert!(Error::from_status(403, "x").is_ignorable());
        assert!(!Error::from_status(404, "x").is_ignorable());
        assert!(Error::from_status(500, "x").is_transient());
        assert!(!Error::validation("x").is_transient());
    }

    #[test]
    fn test_only_500_is_a_server_error() {
        for status in [502, 503, 504] {
            let error = Error::from_status(status, "x");
            assert!(matches!(error, Error::Unexpected(s) if s == status));
            assert_eq!(error.user_message(), "An error occurred. Please try again.");
            assert!(error.is_transient());
        }
        assert!(!Error::from_status(418, "x").is_transient());
    }

    #[test]
    fn test_needs_manifest() {
        assert!(MediaType::Audio.needs_manifest());
        assert!(MediaType::Video.needs_manifest());
        assert!(!MediaType::Image.needs_manifest());
        assert!(!MediaType::Unknown.needs_manifest());
    }
}
