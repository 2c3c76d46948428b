pub mod shared {
    pub mod core {
        pub mod blob_encoding;
        pub mod primitives;
    }
    pub mod infrastructure {
        pub mod content_store;
        pub mod local_cache;
    }
}

pub mod modules {
    pub mod projects {
        pub mod core {
            pub mod collection;
            pub mod project;
        }
        pub mod use_cases {
            pub mod sync_projects {
                pub mod errors;
                pub mod handler;
                pub mod outcome;
                pub mod store;
            }
            pub mod upload_image {
                pub mod handler;
                pub mod path;
                pub mod pending_file;
            }
        }
        pub mod adapters {
            pub mod inbound {
                pub mod http;
            }
        }
    }
}

pub mod shell;

#[cfg(test)]
pub mod tests {
    pub mod fixtures;
}
