use crate::{
    error::{FormError, GatewayError},
    management::{
        BulkDeleteReport, DataGateway, FormController, QueryController, SelectionController,
    },
    remote::Remote,
    schema::{EntityKind, EntitySchema},
    types::{Entity, EntityId, ListParams, SortOrder},
};

/// Where filtering and slicing into pages happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// The whole collection is cached; the view is sliced locally.
    Client,
    /// The server returns one filtered page; the cache is that page.
    Server,
}

/// List/detail management of one entity type: the query, gateway, form and
/// selection controllers wired together.
pub struct EntityManager<R> {
    schema: &'static EntitySchema,
    gateway: DataGateway<R>,
    query: QueryController,
    form: FormController,
    selection: SelectionController,
    paging: Paging,
}

impl<R: Remote> EntityManager<R> {
    /// Local remotes page on the client, servers page on the server.
    pub fn new(kind: EntityKind, remote: R, page_size: usize) -> Self {
        let paging = if remote.is_local() {
            Paging::Client
        } else {
            Paging::Server
        };
        Self::with_paging(kind, remote, page_size, paging)
    }

    pub fn with_paging(kind: EntityKind, remote: R, page_size: usize, paging: Paging) -> Self {
        let schema = kind.schema();
        Self {
            schema,
            gateway: DataGateway::new(schema.collection, remote),
            query: QueryController::for_schema(schema, page_size),
            form: FormController::new(schema),
            selection: SelectionController::new(),
            paging,
        }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn gateway(&self) -> &DataGateway<R> {
        &self.gateway
    }

    pub fn query(&self) -> &QueryController {
        &self.query
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Reloads the cache for the current query and prunes the selection.
    pub async fn refresh(&mut self) -> Result<(), GatewayError> {
        let params = match self.paging {
            Paging::Client => ListParams::all(),
            Paging::Server => self.query.to_params(),
        };
        self.gateway.list(&params).await?;
        self.selection.prune(self.gateway.cache());
        Ok(())
    }

    pub fn set_search_term(&mut self, text: &str) {
        self.query.set_search_term(text);
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.query.set_filter(key, value);
    }

    pub fn set_sort(&mut self, sort: Option<SortOrder>) {
        self.query.set_sort(sort);
    }

    pub fn set_page(&mut self, page: usize) {
        self.query.set_page(page);
    }

    /// The entities currently visible, never more than one page. Entities
    /// created after the last server-side refresh are appended to the cached
    /// page and may push older ones out of view until the next refresh.
    pub fn view(&self) -> Vec<&Entity> {
        visible(self.paging, &self.query, self.gateway.cache())
    }

    pub fn total_pages(&self) -> u32 {
        match self.paging {
            Paging::Client => self.query.total_pages(self.gateway.cache()),
            Paging::Server => self.gateway.total_pages().max(1),
        }
    }

    /// Loads one entity into the cache, e.g. before editing it.
    pub async fn load(&mut self, id: &EntityId) -> Result<Entity, GatewayError> {
        self.gateway.fetch(id).await
    }

    /// Opens the form for a create (`None`) or for editing a cached entity.
    pub fn open_form(&mut self, id: Option<&EntityId>) -> Result<(), FormError> {
        match id {
            None => self.form.open(None),
            Some(id) => {
                let entity = self
                    .gateway
                    .get(id)
                    .ok_or_else(|| FormError::UnknownEntity(id.clone()))?;
                self.form.open(Some(entity));
            }
        }
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        self.form.set_field(name, raw)
    }

    /// Uploads a file and stores the returned URL in `field` of the open form.
    pub async fn attach_upload(
        &mut self,
        field: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, FormError> {
        if !self.form.is_open() {
            return Err(FormError::NotOpen);
        }
        if self.schema.field(field).is_none() {
            return Err(FormError::UnknownField(field.to_string()));
        }
        let url = self.gateway.upload(file_name, bytes).await?;
        self.form.attach(field, &url)?;
        Ok(url)
    }

    pub async fn submit(&mut self) -> Result<Entity, FormError> {
        self.form.submit(&mut self.gateway).await
    }

    pub fn cancel_form(&mut self) {
        self.form.cancel();
    }

    pub async fn delete(&mut self, id: &EntityId) -> Result<(), GatewayError> {
        self.gateway.delete(id).await?;
        self.selection.prune(self.gateway.cache());
        Ok(())
    }

    /// Toggles one id. Ids that are not cached cannot be selected; returns
    /// whether the selection changed.
    pub fn toggle(&mut self, id: &EntityId) -> bool {
        if !self.selection.contains(id) && !self.gateway.contains(id) {
            return false;
        }
        self.selection.toggle(id);
        true
    }

    /// Toggles every entity of the current view.
    pub fn toggle_all(&mut self) {
        let view = visible(self.paging, &self.query, self.gateway.cache());
        self.selection.toggle_all(&view);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub async fn bulk_delete(&mut self) -> BulkDeleteReport {
        self.selection.bulk_delete(&mut self.gateway).await
    }
}

fn visible<'a>(paging: Paging, query: &QueryController, cache: &'a [Entity]) -> Vec<&'a Entity> {
    match paging {
        Paging::Client => query.view(cache),
        Paging::Server => {
            let mut view = query.matching(cache);
            view.truncate(query.page_size());
            view
        }
    }
}
