//! Structural mutations of the project collection. None of these look at timer state apart from
//! archival, which requires the project to be idle.

use std::collections::BTreeMap;

use tracing::warn;
use uuid::Uuid;

use crate::{
    error::TrackerError,
    store::entities::{Project, ProjectCollection, Sprint},
};

pub(crate) fn project_mut<'a>(
    projects: &'a mut ProjectCollection,
    name: &str,
) -> Result<&'a mut Project, TrackerError> {
    projects
        .get_mut(name)
        .ok_or_else(|| TrackerError::ProjectNotFound(name.to_string()))
}

pub(crate) fn project<'a>(
    projects: &'a ProjectCollection,
    name: &str,
) -> Result<&'a Project, TrackerError> {
    projects
        .get(name)
        .ok_or_else(|| TrackerError::ProjectNotFound(name.to_string()))
}

fn ensure_not_blank(name: &str) -> Result<(), TrackerError> {
    if name.trim().is_empty() {
        warn!("Rejected blank name");
        return Err(TrackerError::EmptyName);
    }
    Ok(())
}

pub fn create_project(projects: &mut ProjectCollection, name: &str) -> Result<(), TrackerError> {
    ensure_not_blank(name)?;
    if projects.contains_key(name) {
        warn!("Project {name} already exists");
        return Err(TrackerError::DuplicateName(name.to_string()));
    }
    projects.insert(name.to_string(), Project::default());
    Ok(())
}

/// Makes `sprint_id` the only active sprint of the project.
fn activate(project: &mut Project, sprint_id: &str) {
    for (id, sprint) in project.sprints.iter_mut() {
        sprint.is_active = id == sprint_id;
    }
    project.active_sprint = Some(sprint_id.to_string());
}

/// Creates a sprint and makes it the active one. Returns the generated id.
pub fn create_sprint(
    projects: &mut ProjectCollection,
    project_name: &str,
    sprint_name: &str,
    description: &str,
    start_date: String,
) -> Result<String, TrackerError> {
    let project = project_mut(projects, project_name)?;
    ensure_not_blank(sprint_name)?;

    if project.sprints.values().any(|v| v.name == sprint_name) {
        warn!("Sprint {sprint_name} already exists in {project_name}");
        return Err(TrackerError::DuplicateSprintName {
            project: project_name.to_string(),
            sprint: sprint_name.to_string(),
        });
    }

    let id = Uuid::new_v4().to_string();
    project.sprints.insert(
        id.clone(),
        Sprint {
            id: id.clone(),
            name: sprint_name.to_string(),
            description: description.to_string(),
            start_date,
            entries: BTreeMap::new(),
            is_active: true,
        },
    );
    activate(project, &id);
    Ok(id)
}

pub fn set_active_sprint(
    projects: &mut ProjectCollection,
    project_name: &str,
    sprint_id: &str,
) -> Result<(), TrackerError> {
    let project = project_mut(projects, project_name)?;
    if !project.sprints.contains_key(sprint_id) {
        return Err(TrackerError::SprintNotFound {
            project: project_name.to_string(),
            sprint: sprint_id.to_string(),
        });
    }
    activate(project, sprint_id);
    Ok(())
}

pub fn archive_project(projects: &mut ProjectCollection, name: &str) -> Result<(), TrackerError> {
    let project = project_mut(projects, name)?;
    if project.is_tracking() {
        warn!("Refusing to archive {name} while tracking");
        return Err(TrackerError::ActiveTracking(name.to_string()));
    }
    project.archived = true;
    Ok(())
}

pub fn restore_project(projects: &mut ProjectCollection, name: &str) -> Result<(), TrackerError> {
    let project = project_mut(projects, name)?;
    if !project.archived {
        return Err(TrackerError::NotArchived(name.to_string()));
    }
    project.archived = false;
    Ok(())
}

/// Names in lexicographic order. `BTreeMap` iteration already is.
pub fn list_project_names(projects: &ProjectCollection, include_archived: bool) -> Vec<String> {
    projects
        .iter()
        .filter(|(_, project)| include_archived || !project.archived)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Active sprint first, then by name.
pub fn list_sprints(
    projects: &ProjectCollection,
    project_name: &str,
) -> Result<Vec<Sprint>, TrackerError> {
    let project = project(projects, project_name)?;
    Ok(sorted_sprints(project).into_iter().cloned().collect())
}

pub(crate) fn sorted_sprints(project: &Project) -> Vec<&Sprint> {
    let mut sprints = project.sprints.values().collect::<Vec<_>>();
    sprints.sort_by(|a, b| b.is_active.cmp(&a.is_active).then_with(|| a.name.cmp(&b.name)));
    sprints
}

/// Resolves a sprint by exact id, falling back to exact name.
pub fn find_sprint(
    projects: &ProjectCollection,
    project_name: &str,
    id_or_name: &str,
) -> Result<Sprint, TrackerError> {
    let project = project(projects, project_name)?;
    project
        .sprints
        .get(id_or_name)
        .or_else(|| project.sprints.values().find(|v| v.name == id_or_name))
        .cloned()
        .ok_or_else(|| TrackerError::SprintNotFound {
            project: project_name.to_string(),
            sprint: id_or_name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{
        error::TrackerError,
        store::entities::{Project, ProjectCollection},
    };

    use super::*;

    const DATE: &str = "2018-07-04";

    fn with_project(name: &str) -> ProjectCollection {
        let mut projects = ProjectCollection::new();
        create_project(&mut projects, name).unwrap();
        projects
    }

    #[test]
    fn test_create_project_rejects_duplicates() -> Result<()> {
        let mut projects = ProjectCollection::new();
        create_project(&mut projects, "Alpha")?;

        let result = create_project(&mut projects, "Alpha");
        assert!(matches!(result, Err(TrackerError::DuplicateName(name)) if name == "Alpha"));
        assert_eq!(projects.len(), 1);

        // Names are case-sensitive.
        create_project(&mut projects, "alpha")?;
        assert_eq!(projects.len(), 2);
        Ok(())
    }

    #[test]
    fn test_create_project_rejects_blank_names() {
        let mut projects = ProjectCollection::new();
        assert!(matches!(create_project(&mut projects, ""), Err(TrackerError::EmptyName)));
        assert!(matches!(create_project(&mut projects, "  \t"), Err(TrackerError::EmptyName)));
        assert!(projects.is_empty());
    }

    #[test]
    fn test_create_sprint_validation() -> Result<()> {
        let mut projects = with_project("Alpha");

        assert!(matches!(
            create_sprint(&mut projects, "Missing", "s1", "", DATE.into()),
            Err(TrackerError::ProjectNotFound(_))
        ));
        assert!(matches!(
            create_sprint(&mut projects, "Alpha", " ", "", DATE.into()),
            Err(TrackerError::EmptyName)
        ));

        create_sprint(&mut projects, "Alpha", "s1", "first", DATE.into())?;
        assert!(matches!(
            create_sprint(&mut projects, "Alpha", "s1", "again", DATE.into()),
            Err(TrackerError::DuplicateSprintName { .. })
        ));

        // Uniqueness is per project.
        create_project(&mut projects, "Beta")?;
        create_sprint(&mut projects, "Beta", "s1", "", DATE.into())?;
        Ok(())
    }

    #[test]
    fn test_new_sprint_becomes_only_active_sprint() -> Result<()> {
        let mut projects = with_project("Alpha");

        let first = create_sprint(&mut projects, "Alpha", "s1", "", DATE.into())?;
        let second = create_sprint(&mut projects, "Alpha", "s2", "", DATE.into())?;

        let project = &projects["Alpha"];
        assert_eq!(project.active_sprint.as_deref(), Some(second.as_str()));
        assert!(project.sprints[&second].is_active);
        assert!(!project.sprints[&first].is_active);
        assert_eq!(project.sprints[&second].start_date, DATE);
        Ok(())
    }

    #[test]
    fn test_set_active_sprint_deactivates_others() -> Result<()> {
        let mut projects = with_project("Alpha");
        let first = create_sprint(&mut projects, "Alpha", "s1", "", DATE.into())?;
        let second = create_sprint(&mut projects, "Alpha", "s2", "", DATE.into())?;

        set_active_sprint(&mut projects, "Alpha", &first)?;

        let project = &projects["Alpha"];
        assert_eq!(project.active_sprint.as_deref(), Some(first.as_str()));
        let active = project.sprints.values().filter(|v| v.is_active).count();
        assert_eq!(active, 1);
        assert!(!project.sprints[&second].is_active);

        assert!(matches!(
            set_active_sprint(&mut projects, "Alpha", "nope"),
            Err(TrackerError::SprintNotFound { .. })
        ));
        assert!(matches!(
            set_active_sprint(&mut projects, "Missing", &first),
            Err(TrackerError::ProjectNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_archive_and_restore() -> Result<()> {
        let mut projects = with_project("Alpha");

        assert!(matches!(
            restore_project(&mut projects, "Alpha"),
            Err(TrackerError::NotArchived(_))
        ));

        projects.get_mut("Alpha").unwrap().start_time = Some(chrono::Utc::now());
        assert!(matches!(
            archive_project(&mut projects, "Alpha"),
            Err(TrackerError::ActiveTracking(_))
        ));
        assert!(!projects["Alpha"].archived);

        projects.get_mut("Alpha").unwrap().start_time = None;
        archive_project(&mut projects, "Alpha")?;
        assert!(projects["Alpha"].archived);

        restore_project(&mut projects, "Alpha")?;
        assert!(!projects["Alpha"].archived);

        assert!(matches!(
            archive_project(&mut projects, "Missing"),
            Err(TrackerError::ProjectNotFound(_))
        ));
        Ok(())
    }

    #[test]
    fn test_list_project_names() {
        let mut projects = ProjectCollection::new();
        for name in ["gamma", "Alpha", "beta"] {
            create_project(&mut projects, name).unwrap();
        }
        projects.insert(
            "archived".into(),
            Project {
                archived: true,
                ..Default::default()
            },
        );

        assert_eq!(
            list_project_names(&projects, false),
            vec!["Alpha", "beta", "gamma"]
        );
        assert_eq!(
            list_project_names(&projects, true),
            vec!["Alpha", "archived", "beta", "gamma"]
        );
    }

    #[test]
    fn test_list_sprints_order() -> Result<()> {
        let mut projects = with_project("Alpha");
        for name in ["delta", "bravo", "charlie"] {
            create_sprint(&mut projects, "Alpha", name, "", DATE.into())?;
        }
        let bravo = find_sprint(&projects, "Alpha", "bravo")?;
        set_active_sprint(&mut projects, "Alpha", &bravo.id)?;

        let names = list_sprints(&projects, "Alpha")?
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["bravo", "charlie", "delta"]);

        let charlie = find_sprint(&projects, "Alpha", "charlie")?;
        set_active_sprint(&mut projects, "Alpha", &charlie.id)?;
        let names = list_sprints(&projects, "Alpha")?
            .into_iter()
            .map(|v| v.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["charlie", "bravo", "delta"]);
        Ok(())
    }

    #[test]
    fn test_find_sprint_by_id_or_name() -> Result<()> {
        let mut projects = with_project("Alpha");
        let id = create_sprint(&mut projects, "Alpha", "s1", "", DATE.into())?;

        assert_eq!(find_sprint(&projects, "Alpha", &id)?.name, "s1");
        assert_eq!(find_sprint(&projects, "Alpha", "s1")?.id, id);
        assert!(matches!(
            find_sprint(&projects, "Alpha", "s2"),
            Err(TrackerError::SprintNotFound { .. })
        ));
        Ok(())
    }
}
