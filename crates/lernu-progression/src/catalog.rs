use lernu_types::{Lesson, Unit};

/// Rebuild the unit tree from the flat lesson list the backend serves. Units
/// come out sorted by `unit_order`, lessons within each unit by `lesson_order`.
pub fn group_units(lessons: &[Lesson]) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();

    for lesson in lessons {
        match units.iter_mut().find(|u| u.id == lesson.unit_id) {
            Some(unit) => unit.lessons.push(lesson.clone()),
            None => units.push(Unit {
                id: lesson.unit_id.clone(),
                name: lesson.unit_name.clone(),
                description: lesson.unit_description.clone(),
                unit_order: lesson.unit_order,
                lessons: vec![lesson.clone()],
            }),
        }
    }

    for unit in &mut units {
        unit.lessons.sort_by_key(|l| l.lesson_order);
    }
    units.sort_by_key(|u| u.unit_order);
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locks::test_fixtures::lesson;

    #[test]
    fn groups_and_sorts_units_and_lessons() {
        let lessons = vec![
            lesson("l-2-1", "u2", 2, 1),
            lesson("l-1-2", "u1", 1, 2),
            lesson("l-1-1", "u1", 1, 1),
        ];

        let units = group_units(&lessons);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, "u1");
        assert_eq!(units[0].lessons[0].id, "l-1-1");
        assert_eq!(units[0].lessons[1].id, "l-1-2");
        assert_eq!(units[1].id, "u2");
    }

    #[test]
    fn empty_lesson_list_yields_no_units() {
        assert!(group_units(&[]).is_empty());
    }
}
