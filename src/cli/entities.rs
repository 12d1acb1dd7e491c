use std::path::PathBuf;

use crate::{
    config, error, info,
    management::EntityManager,
    remote::Remote,
    schema::EntityKind,
    success,
    types::{EntityId, SortOrder},
    warning,
};

use super::display;

type Manager = EntityManager<Box<dyn Remote>>;

/// Query flags shared by `list` and `bulk-delete --visible`.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub sort: Option<SortOrder>,
    pub page: Option<usize>,
}

fn manager(kind: EntityKind, remote: Box<dyn Remote>) -> Manager {
    EntityManager::new(kind, remote, config::page_size())
}

/// Applies the query and loads the matching entities. Every setter resets
/// the page, so the page goes last.
async fn load_view(manager: &mut Manager, query: &QueryOptions) {
    if let Some(search) = &query.search {
        manager.set_search_term(search);
    }
    for (key, value) in &query.filters {
        if !manager.schema().allows_filter(key) {
            warning!(
                "{} is not a filter of {} (offered: {}); applying it anyway.",
                key,
                manager.schema().collection,
                manager.schema().filter_keys.join(", ")
            );
        }
        manager.set_filter(key, value);
    }
    manager.set_sort(query.sort.clone());
    if let Some(page) = query.page {
        manager.set_page(page);
    }

    let collection = manager.schema().collection;
    if manager.gateway().is_offline() {
        info!("Working offline on the local store.");
    }
    let pb = display::spinner(format!("Loading {}...", collection));
    let result = manager.refresh().await;
    pb.finish_and_clear();
    if let Err(e) = result {
        error!("Cannot load {}. Err: {}", collection, e);
    }
}

pub async fn list(kind: EntityKind, remote: Box<dyn Remote>, query: QueryOptions) {
    let mut manager = manager(kind, remote);
    load_view(&mut manager, &query).await;

    let view = manager.view();
    if view.is_empty() {
        warning!("No {} found on page {}.", kind.collection(), manager.query().page());
        return;
    }

    println!("{}", display::entity_table(manager.schema(), &view));
    info!(
        "Page {} of {}",
        manager.query().page(),
        manager.total_pages()
    );
}

pub async fn show(kind: EntityKind, remote: Box<dyn Remote>, id: String) {
    let mut manager = manager(kind, remote);
    let id = EntityId::new(id);

    let pb = display::spinner(format!("Loading {} {}...", kind, id));
    let result = manager.load(&id).await;
    pb.finish_and_clear();

    match result {
        Ok(entity) => println!("{}", display::detail_table(&entity)),
        Err(e) => error!("Cannot load {} {}. Err: {}", kind, id, e),
    }
}

/// Fills the open form from `--set` and `--upload` flags.
async fn fill_form(
    manager: &mut Manager,
    sets: &[(String, String)],
    uploads: &[(String, PathBuf)],
) {
    for (name, value) in sets {
        if let Err(e) = manager.set_field(name, value) {
            error!("Cannot set {}. Err: {}", name, e);
        }
    }

    for (field, path) in uploads {
        let bytes = match async_fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => error!("Cannot read {}. Err: {}", path.display(), e),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| field.clone());

        let pb = display::spinner(format!("Uploading {}...", file_name));
        let result = manager.attach_upload(field, &file_name, bytes).await;
        pb.finish_and_clear();

        match result {
            Ok(url) => info!("Uploaded {} to {}", file_name, url),
            Err(e) => error!("Cannot upload {}. Err: {}", file_name, e),
        }
    }
}

pub async fn create(
    kind: EntityKind,
    remote: Box<dyn Remote>,
    sets: Vec<(String, String)>,
    uploads: Vec<(String, PathBuf)>,
) {
    let mut manager = manager(kind, remote);
    if let Err(e) = manager.open_form(None) {
        error!("Cannot open form. Err: {}", e);
    }
    fill_form(&mut manager, &sets, &uploads).await;

    let pb = display::spinner(format!("Creating {}...", kind));
    let result = manager.submit().await;
    pb.finish_and_clear();

    match result {
        Ok(entity) => {
            success!("Created {} {}", kind, entity.id);
            println!("{}", display::detail_table(&entity));
        }
        Err(e) if e.is_validation() => {
            error!("Cannot create {}: {}. Set fields with --set name=value.", kind, e)
        }
        Err(e) => error!("Cannot create {}. Err: {}", kind, e),
    }
}

pub async fn update(
    kind: EntityKind,
    remote: Box<dyn Remote>,
    id: String,
    sets: Vec<(String, String)>,
    uploads: Vec<(String, PathBuf)>,
) {
    let mut manager = manager(kind, remote);
    let id = EntityId::new(id);

    let pb = display::spinner(format!("Loading {} {}...", kind, id));
    let loaded = manager.load(&id).await;
    pb.finish_and_clear();
    if let Err(e) = loaded {
        error!("Cannot load {} {}. Err: {}", kind, id, e);
    }

    if let Err(e) = manager.open_form(Some(&id)) {
        error!("Cannot open form. Err: {}", e);
    }
    fill_form(&mut manager, &sets, &uploads).await;

    let pb = display::spinner(format!("Updating {} {}...", kind, id));
    let result = manager.submit().await;
    pb.finish_and_clear();

    match result {
        Ok(entity) => {
            success!("Updated {} {}", kind, entity.id);
            println!("{}", display::detail_table(&entity));
        }
        Err(e) if e.is_validation() => error!("Cannot update {} {}: {}", kind, id, e),
        Err(e) => error!("Cannot update {} {}. Err: {}", kind, id, e),
    }
}

pub async fn delete(kind: EntityKind, remote: Box<dyn Remote>, id: String) {
    let mut manager = manager(kind, remote);
    let id = EntityId::new(id);

    let pb = display::spinner(format!("Deleting {} {}...", kind, id));
    let result = manager.delete(&id).await;
    pb.finish_and_clear();

    match result {
        Ok(()) => success!("Deleted {} {}", kind, id),
        Err(e) => error!("Cannot delete {} {}. Err: {}", kind, id, e),
    }
}

/// Deletes the given ids and, with `visible`, every entity of the queried
/// page.
pub async fn bulk_delete(
    kind: EntityKind,
    remote: Box<dyn Remote>,
    ids: Vec<String>,
    visible: bool,
    query: QueryOptions,
) {
    let mut manager = manager(kind, remote);
    load_view(&mut manager, &query).await;

    if visible {
        manager.toggle_all();
    }

    for id in ids.into_iter().map(EntityId::new) {
        if manager.selection().contains(&id) || manager.toggle(&id) {
            continue;
        }
        // not on the loaded page
        match manager.load(&id).await {
            Ok(_) => {
                manager.toggle(&id);
            }
            Err(e) => warning!("Skipping {} {}. Err: {}", kind, id, e),
        }
    }

    let count = manager.selection().len();
    if count == 0 {
        warning!("Nothing selected, no {} deleted.", kind.collection());
        return;
    }

    let pb = display::spinner(format!("Deleting {} {}...", count, kind.collection()));
    let report = manager.bulk_delete().await;
    pb.finish_and_clear();

    println!("{}", display::bulk_delete_table(&report));
    if report.is_complete() {
        success!("Deleted {} {}", report.deleted.len(), kind.collection());
    } else {
        warning!(
            "Deleted {} of {} {}; {} failed",
            report.deleted.len(),
            count,
            kind.collection(),
            report.failed.len()
        );
    }
}
