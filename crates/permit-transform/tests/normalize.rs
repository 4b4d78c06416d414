//! Normalizing multi-file domains end to end through the readers.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use permit_model::ValueTag;
use permit_transform::{DomainRecipe, TransformError, build_canonical, extract_series};
use tempfile::TempDir;

const USE6_2001: &str = "\
총합계,시점,동수별,동수별,연면적별,연면적별
총합계,시점,용도별,용도별,용도별,용도별
총합계,시점,주거용,교육사회용,주거용,교육사회용
합계,2001.01,100,5,\"1,500\",50
합계,2001.02,110,-,\"1,600\",-
";

const USE6_2022: &str = "\
총합계,시점,동수별,동수별,연면적별,연면적별
총합계,시점,용도별,용도별,용도별,용도별
총합계,시점,주거용,교육및사회용,주거용,교육및사회용
합계,2001.03,120,7,\"1,700\",70
";

const USE6_RECIPE: &str = r#"
name = "use6"
levels = ["value", "use6"]

[[groups]]
steps = [
    { kind = "drop_index_level", level = 0 },
    { kind = "drop_column_level", level = 1 },
    { kind = "rename_values", level = 0, mapping = { "동수별" = "동수", "연면적별" = "연면적" } },
]

[[groups.sources]]
path = "use6_2001.csv"
encoding = "cp949"
header = [0, 1, 2]
index_columns = [0, 1]
date_column = 1

[[groups.sources]]
path = "use6_2022.csv"
encoding = "cp949"
header = [0, 1, 2]
index_columns = [0, 1]
date_column = 1

[[steps]]
kind = "merge_renamed"
old = ["동수", "교육사회용"]
new = ["동수", "교육및사회용"]

[[steps]]
kind = "merge_renamed"
old = ["연면적", "교육사회용"]
new = ["연면적", "교육및사회용"]
"#;

fn write_cp949(dir: &Path, name: &str, text: &str) {
    let (bytes, _, _) = encoding_rs::EUC_KR.encode(text);
    fs::write(dir.join(name), bytes).unwrap();
}

fn ym(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn use6_fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_cp949(dir.path(), "use6_2001.csv", USE6_2001);
    write_cp949(dir.path(), "use6_2022.csv", USE6_2022);
    dir
}

#[test]
fn renamed_category_is_reconciled_across_releases() {
    let dir = use6_fixture();
    let recipe: DomainRecipe = toml::from_str(USE6_RECIPE).unwrap();

    let table = build_canonical(&recipe, dir.path()).unwrap();

    assert_eq!(table.domain(), "use6");
    assert_eq!(table.level_names(), ["value", "use6"]);
    assert_eq!(table.index(), [ym(2001, 1), ym(2001, 2), ym(2001, 3)]);
    assert_eq!(table.value_tags(), ValueTag::ALL.to_vec());
    assert!(table.column(&["동수", "교육사회용"]).is_none());

    let merged = table.column(&["동수", "교육및사회용"]).unwrap();
    assert_eq!(merged.values, vec![Some(5.0), None, Some(7.0)]);
    let floor_area = table.column(&["연면적", "주거용"]).unwrap();
    assert_eq!(floor_area.values, vec![Some(1500.0), Some(1600.0), Some(1700.0)]);
}

#[test]
fn extracted_series_follow_column_order() {
    let dir = use6_fixture();
    let recipe: DomainRecipe = toml::from_str(USE6_RECIPE).unwrap();
    let table = build_canonical(&recipe, dir.path()).unwrap();

    let names: Vec<String> = extract_series(&table).map(|series| series.name).collect();
    assert_eq!(
        names,
        vec![
            "use6_동수_주거용",
            "use6_연면적_주거용",
            "use6_동수_교육및사회용",
            "use6_연면적_교육및사회용",
        ]
    );

    // The iterator restarts from the first column.
    let first = extract_series(&table).next().unwrap();
    assert_eq!(first.key, vec!["동수", "주거용"]);
    assert_eq!(first.index.len(), 3);
}

#[test]
fn unrenamed_value_labels_are_a_schema_mismatch() {
    let dir = use6_fixture();
    let mut recipe: DomainRecipe = toml::from_str(USE6_RECIPE).unwrap();
    recipe.groups[0].steps.pop();
    recipe.steps.clear();

    match build_canonical(&recipe, dir.path()).unwrap_err() {
        TransformError::SchemaMismatch(mismatch) => {
            assert_eq!(mismatch.context, "use6");
            assert_eq!(mismatch.expected, vec!["동수", "연면적"]);
            assert_eq!(mismatch.found, vec!["동수별", "연면적별"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn leftover_row_levels_are_rejected() {
    let dir = use6_fixture();
    let mut recipe: DomainRecipe = toml::from_str(USE6_RECIPE).unwrap();
    recipe.groups[0].steps.remove(0);

    assert!(matches!(
        build_canonical(&recipe, dir.path()),
        Err(TransformError::UnresolvedIndexLevels { .. })
    ));
}

#[test]
fn separate_value_groups_are_joined_and_pivoted() {
    let dir = TempDir::new().unwrap();
    let count = "\
시도별,용도별,세부용도별,규모별,단위,시점,계
전국,주거용,단독주택,합계,동,2011.01 월,10
전국,주거용,공동주택,합계,동,2011.01 월,20
전국,주거용,단독주택,합계,동,2011.02 월,11
전국,주거용,공동주택,합계,동,2011.02 월,21
";
    let floor_area = count.replace(",동,", ",㎡,").replace(",10\n", ",100\n");
    fs::write(dir.path().join("count.csv"), count).unwrap();
    fs::write(dir.path().join("area.csv"), floor_area).unwrap();

    let recipe: DomainRecipe = toml::from_str(
        r#"
        name = "use28"
        levels = ["value", "use28", "use28_sub"]

        [[groups]]
        sources = [{ path = "count.csv", index_columns = [1, 2, 5], date_column = 5, date_format = { kind = "pattern", format = "%Y.%m 월" } }]
        steps = [{ kind = "select_column", label = "계", rename = "동수" }]

        [[groups]]
        sources = [{ path = "area.csv", index_columns = [1, 2, 5], date_column = 5, date_format = { kind = "pattern", format = "%Y.%m 월" } }]
        steps = [{ kind = "select_column", label = "계", rename = "연면적" }]

        [[steps]]
        kind = "pivot"
        levels = [0, 1]
        "#,
    )
    .unwrap();

    let table = build_canonical(&recipe, dir.path()).unwrap();
    assert_eq!(table.index(), [ym(2011, 1), ym(2011, 2)]);
    assert_eq!(table.width(), 4);
    assert_eq!(
        table.column(&["동수", "주거용", "공동주택"]).unwrap().values,
        vec![Some(20.0), Some(21.0)]
    );
    assert_eq!(
        table.column(&["연면적", "주거용", "단독주택"]).unwrap().values,
        vec![Some(100.0), Some(11.0)]
    );
}
