use anyhow::{bail, Context, Result};
use spatial_reasoner::error::SpatialError;
use spatial_reasoner::relation::SpatialRelation;
use spatial_reasoner::scene::Scene;
use spatial_reasoner::settings::{self};

fn main() -> Result<()> {
    colog::init();

    let settings = settings::load_config()?;
    if settings.print_config {
        println!("{}", settings.to_toml()?);
        return Ok(());
    }
    log::debug!("{}", settings);

    let Some(path) = settings.scene.as_deref() else {
        bail!("No scene given. Pass a JSON file of objects with --scene <path>");
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file {}", path))?;

    let mut scene = settings.build_scene()?;
    scene.load_from_json(&json)?;
    log::info!("Loaded {} objects from {}", scene.len(), path);

    let relations = select_relations(
        &mut scene,
        settings.subject.as_deref(),
        settings.object.as_deref(),
    )?;
    log::info!("Deduced {} relations", relations.len());

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&relations)?);
    } else {
        for relation in &relations {
            println!("{}", scene.describe(relation));
        }
    }
    Ok(())
}

fn select_relations(
    scene: &mut Scene,
    subject: Option<&str>,
    object: Option<&str>,
) -> Result<Vec<SpatialRelation>> {
    let relations = match object {
        Some(id) => {
            let index = scene
                .index_of_id(id)
                .ok_or_else(|| SpatialError::ObjectNotFound(id.to_string()))?;
            scene.relations_of(index)?.to_vec()
        }
        None => scene.relate_all(),
    };
    if let Some(id) = subject {
        if scene.index_of_id(id).is_none() {
            return Err(SpatialError::ObjectNotFound(id.to_string()).into());
        }
        return Ok(relations.into_iter().filter(|r| r.subject == id).collect());
    }
    Ok(relations)
}
