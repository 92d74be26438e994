//! # Allow-list de Paths
//! src/policy.rs
//!
//! Conjunto fijo de paths que el servidor está dispuesto a servir.
//! Se construye una vez al arrancar y se comparte en solo lectura entre
//! todos los workers (`Arc<AllowList>`), así que no necesita locks.
//!
//! La comparación es exacta: sin normalizar, sin equivalencia de `/`
//! final y sin resolver `..`.

use std::collections::HashSet;

/// Paths servibles por defecto
pub const DEFAULT_PATHS: [&str; 11] = [
    "/index.html",
    "/spring.svg",
    "/spring.png",
    "/resources.html",
    "/styles.css",
    "/app.js",
    "/links.html",
    "/forms.html",
    "/classic.html",
    "/events.html",
    "/events.js",
];

/// Conjunto inmutable de paths permitidos
#[derive(Debug, Clone)]
pub struct AllowList {
    paths: HashSet<String>,
}

impl AllowList {
    /// Crea una allow-list a partir de cualquier colección de paths
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::policy::AllowList;
    ///
    /// let allow = AllowList::new(["/a.html", "/b.css"]);
    /// assert!(allow.is_allowed("/a.html"));
    /// assert!(!allow.is_allowed("/a.html/"));
    /// ```
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_allowed(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_PATHS)
    }
}
