//! # Decodificación de Query Strings
//! src/http/query.rs
//!
//! Convierte `a=1&b=hola%20mundo&a=2` en un multimapa ordenado:
//!
//! ```text
//! a -> ["1", "2"]
//! b -> ["hola mundo"]
//! ```
//!
//! Reglas:
//! - Los segmentos vacíos (`&&`) se ignoran.
//! - Cada segmento se divide en el primer `=`; sin `=` el valor es `""`.
//! - Key y value se decodifican con percent-decoding UTF-8 (`+` es espacio).
//! - Un escape malformado (`%zz`, `%4`) se deja pasar literalmente.

use url::form_urlencoded;

/// Multimapa de query parameters que preserva el orden
///
/// Las keys quedan en el orden de su primera aparición y los valores
/// repetidos en el orden en que llegaron.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Crea un multimapa vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un valor bajo `key`, acumulando si la key ya existe
    pub fn append(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Primer valor insertado para `key`, o `None` si no existe
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::http::query;
    ///
    /// let params = query::decode("a=1&a=2");
    /// assert_eq!(params.first("a"), Some("1"));
    /// assert_eq!(params.first("b"), None);
    /// ```
    pub fn first(&self, key: &str) -> Option<&str> {
        self.all(key).first().map(String::as_str)
    }

    /// Todos los valores de `key` en orden de llegada (vacío si no existe)
    pub fn all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Itera `(key, valores)` en orden de primera aparición
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Número de keys distintas
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decodifica una query string cruda (sin el `?` inicial)
///
/// Nunca falla: la función es pura y cualquier entrada produce un mapa.
pub fn decode(raw: &str) -> QueryParams {
    let mut params = QueryParams::new();

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        params.append(key.into_owned(), value.into_owned());
    }

    params
}
