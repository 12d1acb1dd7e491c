//! Static schemas of the manageable entity types.
//!
//! Each schema names the remote collection, the fields a form can edit and
//! how their raw input is coerced, the fields that must be filled before a
//! submit, the fields searched by free text and the keys offered as filters.

use std::fmt;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    LongText,
    Integer,
    Decimal,
    Bool,
    /// `YYYY-MM-DD`
    Date,
    /// Comma-separated in forms, a list of strings on the wire.
    Tags,
    /// A single display name in forms, split into two wire fields.
    PersonName {
        first: &'static str,
        last: &'static str,
    },
    /// URL of an uploaded file.
    Url,
}

impl FieldKind {
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Integer => "an integer",
            FieldKind::Decimal => "a number",
            FieldKind::Bool => "true or false",
            FieldKind::Date => "a date (YYYY-MM-DD)",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
    }
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub collection: &'static str,
    /// Field shown as the row title in listings.
    pub title_field: &'static str,
    pub fields: &'static [FieldSpec],
    pub search_fields: &'static [&'static str],
    pub filter_keys: &'static [&'static str],
    /// Allowed statuses; the first one is given to new entities.
    pub statuses: &'static [&'static str],
    /// Columns of the list table after `id` and the title.
    pub columns: &'static [&'static str],
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Names of required fields as they appear on the wire. A required person
    /// name only requires its first part; single-word names are valid.
    pub fn required_wire_fields(&self) -> Vec<&'static str> {
        self.required_fields()
            .map(|f| match f.kind {
                FieldKind::PersonName { first, .. } => first,
                _ => f.name,
            })
            .collect()
    }

    /// Whether `key` is one of the filters offered for this type. `id` is
    /// always accepted.
    pub fn allows_filter(&self, key: &str) -> bool {
        key == "id" || self.filter_keys.contains(&key)
    }

    pub fn allows_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s.eq_ignore_ascii_case(status))
    }

    pub fn default_status(&self) -> Option<&'static str> {
        self.statuses.first().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum EntityKind {
    #[value(alias = "users")]
    User,
    #[value(alias = "courses")]
    Course,
    #[value(alias = "exams")]
    Exam,
    #[value(alias = "quizzes")]
    Quiz,
    News,
    #[value(alias = "coupons")]
    Coupon,
    #[value(alias = "products")]
    Product,
    #[value(alias = "orders")]
    Order,
    Media,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::User,
        EntityKind::Course,
        EntityKind::Exam,
        EntityKind::Quiz,
        EntityKind::News,
        EntityKind::Coupon,
        EntityKind::Product,
        EntityKind::Order,
        EntityKind::Media,
    ];

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::User => &USER,
            EntityKind::Course => &COURSE,
            EntityKind::Exam => &EXAM,
            EntityKind::Quiz => &QUIZ,
            EntityKind::News => &NEWS,
            EntityKind::Coupon => &COUPON,
            EntityKind::Product => &PRODUCT,
            EntityKind::Order => &ORDER,
            EntityKind::Media => &MEDIA,
        }
    }

    pub fn collection(self) -> &'static str {
        self.schema().collection
    }

    pub fn from_collection(collection: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == collection)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Course => "course",
            EntityKind::Exam => "exam",
            EntityKind::Quiz => "quiz",
            EntityKind::News => "news article",
            EntityKind::Coupon => "coupon",
            EntityKind::Product => "product",
            EntityKind::Order => "order",
            EntityKind::Media => "media asset",
        };
        f.write_str(name)
    }
}

static USER: EntitySchema = EntitySchema {
    kind: EntityKind::User,
    collection: "users",
    title_field: "email",
    fields: &[
        required(
            "name",
            FieldKind::PersonName {
                first: "first_name",
                last: "last_name",
            },
        ),
        required("email", FieldKind::Text),
        required("role", FieldKind::Text),
        field("phone", FieldKind::Text),
        field("avatar", FieldKind::Url),
    ],
    search_fields: &["first_name", "last_name", "email"],
    filter_keys: &["status", "role"],
    statuses: &["active", "expired"],
    columns: &["first_name", "last_name", "role", "status"],
};

static COURSE: EntitySchema = EntitySchema {
    kind: EntityKind::Course,
    collection: "courses",
    title_field: "title",
    fields: &[
        required("title", FieldKind::Text),
        required("category", FieldKind::Text),
        field("instructor", FieldKind::Text),
        field("price", FieldKind::Decimal),
        field("duration_hours", FieldKind::Integer),
        field("tags", FieldKind::Tags),
        field("description", FieldKind::LongText),
        field("thumbnail", FieldKind::Url),
        field("featured", FieldKind::Bool),
    ],
    search_fields: &["title", "instructor"],
    filter_keys: &["status", "category"],
    statuses: &["draft", "published"],
    columns: &["category", "instructor", "price", "status"],
};

static EXAM: EntitySchema = EntitySchema {
    kind: EntityKind::Exam,
    collection: "exams",
    title_field: "title",
    fields: &[
        required("title", FieldKind::Text),
        required("course", FieldKind::Text),
        required("start_date", FieldKind::Date),
        required("end_date", FieldKind::Date),
        field("duration_minutes", FieldKind::Integer),
        field("total_marks", FieldKind::Integer),
        field("passing_marks", FieldKind::Integer),
        field("instructions", FieldKind::LongText),
    ],
    search_fields: &["title", "course"],
    filter_keys: &["status", "course"],
    statuses: &["draft", "published", "expired"],
    columns: &["course", "start_date", "end_date", "status"],
};

static QUIZ: EntitySchema = EntitySchema {
    kind: EntityKind::Quiz,
    collection: "quizzes",
    title_field: "title",
    fields: &[
        required("title", FieldKind::Text),
        required("category", FieldKind::Text),
        field("question_count", FieldKind::Integer),
        field("time_limit_minutes", FieldKind::Integer),
        field("tags", FieldKind::Tags),
        field("description", FieldKind::LongText),
    ],
    search_fields: &["title", "category"],
    filter_keys: &["status", "category"],
    statuses: &["draft", "published"],
    columns: &["category", "question_count", "status"],
};

static NEWS: EntitySchema = EntitySchema {
    kind: EntityKind::News,
    collection: "news",
    title_field: "title",
    fields: &[
        required("title", FieldKind::Text),
        required("category", FieldKind::Text),
        field("author", FieldKind::Text),
        field("summary", FieldKind::Text),
        field("content", FieldKind::LongText),
        field("tags", FieldKind::Tags),
        field("image", FieldKind::Url),
        field("publish_date", FieldKind::Date),
    ],
    search_fields: &["title", "author", "summary"],
    filter_keys: &["status", "category"],
    statuses: &["draft", "published"],
    columns: &["category", "author", "publish_date", "status"],
};

static COUPON: EntitySchema = EntitySchema {
    kind: EntityKind::Coupon,
    collection: "coupons",
    title_field: "code",
    fields: &[
        required("code", FieldKind::Text),
        required("discount_type", FieldKind::Text),
        required("discount_value", FieldKind::Decimal),
        required("expiry_date", FieldKind::Date),
        field("usage_limit", FieldKind::Integer),
        field("min_order", FieldKind::Decimal),
    ],
    search_fields: &["code"],
    filter_keys: &["status", "discount_type"],
    statuses: &["active", "expired"],
    columns: &["discount_type", "discount_value", "expiry_date", "status"],
};

static PRODUCT: EntitySchema = EntitySchema {
    kind: EntityKind::Product,
    collection: "products",
    title_field: "name",
    fields: &[
        required("name", FieldKind::Text),
        required("category", FieldKind::Text),
        required("price", FieldKind::Decimal),
        field("sku", FieldKind::Text),
        field("stock", FieldKind::Integer),
        field("tags", FieldKind::Tags),
        field("description", FieldKind::LongText),
        field("image", FieldKind::Url),
    ],
    search_fields: &["name", "sku"],
    filter_keys: &["status", "category"],
    statuses: &["draft", "active"],
    columns: &["category", "price", "stock", "status"],
};

static ORDER: EntitySchema = EntitySchema {
    kind: EntityKind::Order,
    collection: "orders",
    title_field: "customer",
    fields: &[
        required("customer", FieldKind::Text),
        required("total", FieldKind::Decimal),
        field("email", FieldKind::Text),
        field("item_count", FieldKind::Integer),
        field("payment_method", FieldKind::Text),
        field("order_date", FieldKind::Date),
    ],
    search_fields: &["customer", "email"],
    filter_keys: &["status", "payment_method"],
    statuses: &["pending", "processing", "completed", "cancelled"],
    columns: &["total", "payment_method", "order_date", "status"],
};

static MEDIA: EntitySchema = EntitySchema {
    kind: EntityKind::Media,
    collection: "media",
    title_field: "title",
    fields: &[
        required("title", FieldKind::Text),
        required("url", FieldKind::Url),
        field("media_type", FieldKind::Text),
        field("size_bytes", FieldKind::Integer),
        field("alt_text", FieldKind::Text),
    ],
    search_fields: &["title", "alt_text"],
    filter_keys: &["status", "media_type"],
    statuses: &["active"],
    columns: &["media_type", "size_bytes", "url"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_its_collection() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_collection(kind.collection()), Some(kind));
            assert_eq!(kind.schema().kind, kind);
        }
    }

    #[test]
    fn filters_outside_the_offered_keys_are_not_allowed() {
        let courses = EntityKind::Course.schema();
        assert!(courses.allows_filter("category"));
        assert!(courses.allows_filter("id"));
        assert!(!courses.allows_filter("instructor"));
    }

    #[test]
    fn required_person_name_maps_to_first_name() {
        let fields = EntityKind::User.schema().required_wire_fields();
        assert_eq!(fields, vec!["first_name", "email", "role"]);
    }

    #[test]
    fn every_schema_filters_by_status_and_has_a_default() {
        for kind in EntityKind::ALL {
            let schema = kind.schema();
            assert!(schema.default_status().is_some());
            assert!(schema.allows_filter("status"));
        }
    }
}
