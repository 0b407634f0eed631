// End-to-end: raw sheet text → merged collection → query results

use card_gallery::{
    apply, ingest, load_gallery, Category, CategorySelection, DefaultFetcher, GalleryStatus,
    QueryOptions, SheetSource, SortKey,
};
use std::collections::HashSet;
use std::fs;

const MEW_TAB: &str = "\u{feff}Name EN,Name JP,Set,Number,Year,Release,Rarity,Types,Grade,PSA10,isMew\r\n\
Mew,ミュウ,Wizards Promo,8,1999,1999-07-01,Promo,Psychic|Promo,psa 10,120,\r\n\
\"Ancient Mew \"\"Error\"\"\",古代ミュウ,Movie Promo,,2000,,Promo,Psychic,raw,,false\r\n\
,,Nameless Set,99,2001,,,,,,\r\n\
\r\n";

const CAMEO_TAB: &str = "name,set,number,year,notes\n\
Mew,Wizards Promo,8,1999,\"Appears in the background, top left\"\n\
Professor Oak,Base,88,1999,Mew silhouette\n";

const INTL_TAB: &str = "name en,language,year,image\rMew,Korean,2003,https://img.test/mew-kr.png\r";

fn everything(sort: SortKey) -> QueryOptions {
    QueryOptions {
        query: String::new(),
        categories: CategorySelection::all(),
        sort,
    }
}

#[test]
fn test_three_tabs_merge() {
    let cards = ingest(vec![
        (Category::Mew, MEW_TAB),
        (Category::Cameo, CAMEO_TAB),
        (Category::Intl, INTL_TAB),
    ]);

    // Nameless row dropped, nothing de-duplicated
    assert_eq!(cards.len(), 5);

    let ids: HashSet<_> = cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 5);

    let ancient = &cards[1];
    assert_eq!(ancient.name_en, "Ancient Mew \"Error\"");
    assert_eq!(ancient.is_mew, Some(true));
    assert_eq!(ancient.grade.map(|g| g.to_string()).as_deref(), Some("RAW"));

    let mew = &cards[0];
    assert_eq!(mew.types, vec!["Psychic", "Promo"]);
    assert_eq!(mew.population.map(|p| p.psa10), Some(120));

    let korean = &cards[4];
    assert_eq!(korean.language.as_deref(), Some("Korean"));
    assert_eq!(korean.image, "https://img.test/mew-kr.png");
}

#[test]
fn test_query_over_merged_tabs() {
    let cards = ingest(vec![
        (Category::Mew, MEW_TAB),
        (Category::Cameo, CAMEO_TAB),
        (Category::Intl, INTL_TAB),
    ]);

    let cameo_only = QueryOptions {
        query: "mew".to_string(),
        categories: CategorySelection { mew: false, cameo: true, intl: false },
        sort: SortKey::Name,
    };
    let names: Vec<_> = apply(&cards, &cameo_only).iter().map(|c| c.name_en.as_str()).collect();
    assert_eq!(names, vec!["Mew", "Professor Oak"]);

    let by_release = apply(&cards, &everything(SortKey::ReleaseDesc));
    assert_eq!(by_release[0].name_en, "Mew");
    assert_eq!(by_release[0].year, 2003);

    let jp = QueryOptions {
        query: "古代".to_string(),
        ..everything(SortKey::YearDesc)
    };
    let found = apply(&cards, &jp);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name_jp.as_deref(), Some("古代ミュウ"));
}

#[tokio::test]
async fn test_load_from_disk_with_missing_tab() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mew.csv"), MEW_TAB).unwrap();
    fs::write(dir.path().join("cameo.csv"), CAMEO_TAB).unwrap();

    let sources = vec![
        SheetSource::path("Mew", Category::Mew, dir.path().join("mew.csv")),
        SheetSource::path("Cameos", Category::Cameo, dir.path().join("cameo.csv")),
        SheetSource::path("Intl", Category::Intl, dir.path().join("intl.csv")),
    ];

    let gallery = load_gallery(&DefaultFetcher::new(), &sources).await;

    assert_eq!(gallery.status(), GalleryStatus::Partial);
    assert_eq!(gallery.cards.len(), 4);
    assert_eq!(gallery.failures[0].source, "Intl");
}
