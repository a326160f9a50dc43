pub mod user {
    pub mod repository;
    pub mod repository_pg;
    pub mod schema;
}

pub mod friendship {
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}

pub mod message {
    pub mod aggregator;
    pub mod handle;
    pub mod model;
    pub mod repository;
    pub mod repository_pg;
    pub mod route;
    pub mod schema;
    pub mod service;
}
