/// Identity of a record fixed at load time (0-based position among kept rows).
/// Example: `4`
pub type StableId = usize;
/// Identifier for where rows or persisted state came from.
/// Examples: `data.csv`, `order.json`, `inline`
pub type SourceId = String;
/// Raw category label as written in the first CSV column.
/// Examples: `高尾クラス`, `八尾クラス`
pub type CategoryLabel = String;
/// Short ASCII handle for a category, used by renderers for styling.
/// Examples: `takawo`, `yao`, `yamashita`
pub type CategorySlug = String;
/// Presentation group name inside a class.
/// Example: `Group A`
pub type GroupName = String;
/// Presentation theme / title text.
/// Example: `Urban heat islands`
pub type Theme = String;
/// Link to the group's presentation materials.
/// Example: `https://example.org/slides/a`
pub type MaterialsUrl = String;
/// Heading shown above one schedule section.
/// Examples: `Day 1 (4 presentations)`, `Day 2`
pub type SectionLabel = String;
