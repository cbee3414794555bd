mod comics;

pub use comics::ComicService;
