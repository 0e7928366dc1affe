//! 반복 입력 행 목록 (subreddit 입력칸 추가/삭제)
//!
//! 채널과 무관한 로컬 상태입니다. 행 id는 추가 시 부여되고 재사용/재번호 매기기를 하지 않습니다.

use crate::surface::Element;

pub const SUBREDDIT_FIELD: &str = "subreddit[]";
pub const SUBREDDIT_PLACEHOLDER: &str = "e.g., gaming";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub id: RowId,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct FieldList {
    container_id: String,
    name: String,
    placeholder: String,
    rows: Vec<FieldRow>,
    next_id: u64,
}

impl FieldList {
    pub fn new(container_id: &str, name: &str, placeholder: &str) -> Self {
        Self {
            container_id: container_id.to_string(),
            name: name.to_string(),
            placeholder: placeholder.to_string(),
            rows: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subreddits() -> Self {
        Self::new("subreddits", SUBREDDIT_FIELD, SUBREDDIT_PLACEHOLDER)
    }

    /// 빈 행을 맨 뒤에 추가하고 그 id를 반환
    pub fn add(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(FieldRow { id, value: String::new() });
        tracing::trace!("Row {} added to #{}", id, self.container_id);
        id
    }

    /// 해당 행만 제거. 이미 없으면 false
    pub fn remove(&mut self, id: RowId) -> bool {
        match self.rows.iter().position(|r| r.id == id) {
            Some(idx) => {
                self.rows.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, id: RowId, value: impl Into<String>) -> bool {
        match self.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> &[FieldRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 제출 시점의 행 순서대로 값
    pub fn values(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.value.clone()).collect()
    }

    /// 폼 제출용 (name, value) 쌍
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|r| (self.name.clone(), r.value.clone()))
            .collect()
    }

    pub fn render(&self) -> Element {
        Element::new("div").id(self.container_id.clone()).children(self.rows.iter().map(|row| {
            Element::new("div")
                .class("subreddit-input")
                .attr("data-row", row.id.to_string())
                .child(
                    Element::new("input")
                        .attr("type", "text")
                        .attr("name", self.name.clone())
                        .attr("placeholder", self.placeholder.clone())
                        .attr("value", row.value.clone())
                        .attr("required", "required"),
                )
                .child(
                    Element::new("button")
                        .attr("type", "button")
                        .attr("data-remove", row.id.to_string())
                        .text("-"),
                )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_twice_remove_first() {
        let mut list = FieldList::subreddits();
        let first = list.add();
        let second = list.add();
        list.set_value(first, "gaming");
        list.set_value(second, "AskReddit");

        assert!(list.remove(first));
        assert_eq!(list.len(), 1);
        assert_eq!(list.rows()[0].id, second);
        assert_eq!(list.values(), vec!["AskReddit"]);
    }

    #[test]
    fn test_remove_is_scoped_to_row() {
        let mut list = FieldList::subreddits();
        let ids: Vec<_> = (0..3).map(|_| list.add()).collect();
        for (i, id) in ids.iter().enumerate() {
            list.set_value(*id, format!("sub{}", i));
        }

        assert!(list.remove(ids[1]));
        assert!(!list.remove(ids[1]));
        assert_eq!(list.values(), vec!["sub0", "sub2"]);

        // 새 행은 새 id: 삭제된 id를 재사용하지 않음
        let next = list.add();
        assert!(!ids.contains(&next));
    }

    #[test]
    fn test_pairs_use_repeatable_name() {
        let mut list = FieldList::subreddits();
        let a = list.add();
        list.set_value(a, "pics");
        assert_eq!(list.pairs(), vec![("subreddit[]".to_string(), "pics".to_string())]);
    }

    #[test]
    fn test_render_rows_in_order() {
        let mut list = FieldList::subreddits();
        let a = list.add();
        let b = list.add();
        list.set_value(a, "\"quoted\"");

        let el = list.render();
        assert_eq!(el.id.as_deref(), Some("subreddits"));
        let rows: Vec<_> = el.child_elements().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].attrs["data-row"], b.to_string());
        assert!(rows.iter().all(|r| r.has_class("subreddit-input")));
        assert!(el.to_html().contains("value=\"&quot;quoted&quot;\""));
    }
}
