use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Envelope padrão das listagens paginadas: { data, meta }.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            ((total + limit - 1) / limit).max(1)
        } else {
            1
        };
        Self { total, page, limit, total_pages }
    }
}

// Parâmetros de paginação aceitos nas querystrings.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    // Normaliza page/limit para valores seguros (página mínima 1, limite 1..=100).
    pub fn normalize(self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;
        (page, limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageMeta, PageParams};

    #[test]
    fn total_pages_rounds_up_and_never_drops_below_one() {
        assert_eq!(PageMeta::new(0, 1, 10).total_pages, 1);
        assert_eq!(PageMeta::new(10, 1, 10).total_pages, 1);
        assert_eq!(PageMeta::new(11, 1, 10).total_pages, 2);
        assert_eq!(PageMeta::new(95, 1, 10).total_pages, 10);
    }

    #[test]
    fn page_params_clamp_out_of_range_values() {
        let (page, limit, offset) = PageParams { page: Some(0), limit: Some(1000) }.normalize();
        assert_eq!((page, limit, offset), (1, 100, 0));

        let (page, limit, offset) = PageParams { page: Some(3), limit: None }.normalize();
        assert_eq!((page, limit, offset), (3, 10, 20));
    }
}
