use crate::constants::schedule::{
    FIRST_SESSION_CAPACITY, FIRST_SESSION_LABEL, SECOND_SESSION_LABEL,
};
use crate::data::Record;
use crate::types::SectionLabel;

/// One session of the presentation schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionSpec {
    /// Heading shown above the session.
    pub label: SectionLabel,
    /// Presentations in this session; `None` takes everything left.
    pub capacity: Option<usize>,
}

/// Ordered sessions a running order is split into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Sessions in display order.
    pub sections: Vec<SectionSpec>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                SectionSpec {
                    label: FIRST_SESSION_LABEL.to_string(),
                    capacity: Some(FIRST_SESSION_CAPACITY),
                },
                SectionSpec {
                    label: SECOND_SESSION_LABEL.to_string(),
                    capacity: None,
                },
            ],
        }
    }
}

/// One numbered slot in the schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleItem<'a> {
    /// 1-based position in the whole running order.
    pub position: usize,
    /// Record presented in this slot.
    pub record: &'a Record,
}

/// A filled session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleSection<'a> {
    /// Heading from the matching `SectionSpec`.
    pub label: &'a str,
    /// Numbered slots in running order.
    pub items: Vec<ScheduleItem<'a>>,
}

/// Split `order` into the configured sessions, numbering positions from 1.
///
/// Sessions that end up empty are left out. Records beyond the last capped
/// session with no uncapped session after it are not scheduled.
pub fn build_schedule<'a>(
    order: &[&'a Record],
    config: &'a ScheduleConfig,
) -> Vec<ScheduleSection<'a>> {
    let mut sections = Vec::new();
    let mut next = 0;
    for section in &config.sections {
        let remaining = order.len() - next;
        let take = section.capacity.map_or(remaining, |cap| cap.min(remaining));
        if take == 0 {
            continue;
        }
        let items = order[next..next + take]
            .iter()
            .copied()
            .enumerate()
            .map(|(offset, record)| ScheduleItem {
                position: next + offset + 1,
                record,
            })
            .collect();
        sections.push(ScheduleSection {
            label: section.label.as_str(),
            items,
        });
        next += take;
    }
    sections
}
