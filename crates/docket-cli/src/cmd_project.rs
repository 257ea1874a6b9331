use std::path::Path;

use crate::db;

pub fn register(
    db_path: &Path,
    name: &str,
    contractor: &str,
    client: &str,
) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let project = docket_flow::register_project(&store, name, contractor, client)?;
    println!("Registered project {}", project.id);
    println!(
        "  {}  contractor={}  client={}",
        project.name, project.contractor_code, project.client_code
    );
    Ok(())
}

pub fn list(db_path: &Path, json: bool) -> anyhow::Result<()> {
    let store = db::open(db_path)?;
    let projects = store.list_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects registered.");
        return Ok(());
    }
    for project in &projects {
        println!(
            "{}  {:<30}  contractor={}  client={}",
            project.id, project.name, project.contractor_code, project.client_code
        );
    }
    println!("\n({} projects)", projects.len());
    Ok(())
}
