//! 学生存储操作

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{SeaOrmStorage, read_err, write_err};
use crate::entity::students::{ActiveModel, Column, Entity as Students};
use crate::errors::{ObeError, Result};
use crate::models::{
    PaginationInfo, PaginationQuery,
    students::{
        entities::Student,
        requests::{CreateStudentRequest, StudentListQuery},
        responses::StudentListResponse,
    },
};

impl SeaOrmStorage {
    pub async fn create_student_impl(&self, req: CreateStudentRequest) -> Result<Student> {
        let identifier = req.identifier.trim().to_string();
        if identifier.is_empty() {
            return Err(ObeError::validation("Student identifier must not be empty"));
        }

        let model = ActiveModel {
            identifier: Set(identifier),
            display_name: Set(req.display_name),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| write_err("创建学生失败", e))?;

        Ok(result.into_student())
    }

    pub async fn get_student_by_id_impl(&self, id: i64) -> Result<Option<Student>> {
        let result = Students::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn get_student_by_identifier_impl(&self, identifier: &str) -> Result<Option<Student>> {
        let result = Students::find()
            .filter(Column::Identifier.eq(identifier.trim()))
            .one(&self.db)
            .await
            .map_err(|e| read_err("查询学生失败", e))?;

        Ok(result.map(|m| m.into_student()))
    }

    pub async fn list_students_with_pagination_impl(
        &self,
        query: StudentListQuery,
    ) -> Result<StudentListResponse> {
        let (page, size) = PaginationQuery::normalized(query.page, query.size);

        let mut select = Students::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let search = search.trim();
            select = select.filter(
                Condition::any()
                    .add(Column::Identifier.contains(search))
                    .add(Column::DisplayName.contains(search)),
            );
        }

        let paginator = select.order_by_asc(Column::Identifier).paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| read_err("查询学生总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| read_err("查询学生页数失败", e))?;
        let students = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| read_err("查询学生列表失败", e))?;

        Ok(StudentListResponse {
            items: students.into_iter().map(|m| m.into_student()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn list_student_ids_impl(&self) -> Result<Vec<i64>> {
        Students::find()
            .select_only()
            .column(Column::Id)
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| read_err("查询学生 ID 失败", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_create_and_lookup_student() {
        let storage = test_support::storage().await;
        let created = test_support::student(&storage, "s1001").await;

        let by_identifier = storage
            .get_student_by_identifier_impl(" s1001 ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_identifier.id, created.id);
        assert_eq!(storage.list_student_ids_impl().await.unwrap(), vec![created.id]);
    }

    #[tokio::test]
    async fn test_duplicate_identifier_is_conflict() {
        let storage = test_support::storage().await;
        test_support::student(&storage, "s1001").await;
        let err = storage
            .create_student_impl(CreateStudentRequest {
                identifier: "s1001".to_string(),
                display_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ObeError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let storage = test_support::storage().await;
        test_support::student(&storage, "alice").await;
        test_support::student(&storage, "bob").await;

        let resp = storage
            .list_students_with_pagination_impl(StudentListQuery {
                search: Some("ali".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.pagination.total, 1);
    }
}
