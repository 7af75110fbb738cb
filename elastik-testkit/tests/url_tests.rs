//! Method and url of every endpoint, in fluent and initializer form

use elastik::request::{
    ClusterHealthDescriptor, ClusterHealthRequest, DeleteDocumentDescriptor, DeleteDocumentRequest,
    DeleteIndexTemplateRequest, ExplainDescriptor, ExplainRequest, GetDocumentDescriptor,
    GetDocumentRequest, GetIndexTemplateDescriptor, GetIndexTemplateRequest, IndexDocumentDescriptor,
    MultiTermVectorsDescriptor, MultiTermVectorsRequest, PutIndexTemplateDescriptor,
    PutIndexTemplateRequest, SearchDescriptor, SearchRequest,
};
use elastik::query::{MatchAllQuery, Query};
use elastik::Indices;
use elastik_testkit::{CommitActivity, Developer, Project, UrlTester};

#[tokio::test]
async fn test_root_and_ping() {
    UrlTester::get("/")
        .fluent(|c| async move { c.root_node_info().await })
        .await;
    UrlTester::head("/")
        .fluent(|c| async move { c.ping().await })
        .await;
}

#[tokio::test]
async fn test_explain() {
    let project = Project::instance();
    UrlTester::post("/project/project/NEST/_explain")
        .fluent(|c| async move {
            c.explain(ExplainDescriptor::for_document(&project).query(|q| q.match_all(|m| m)))
                .await
        })
        .await
        .initializer(|c| async move {
            let mut request = ExplainRequest::of::<Project>("NEST");
            request.query = Some(MatchAllQuery::new().into());
            c.explain(request).await
        })
        .await;
}

#[tokio::test]
async fn test_explain_with_explicit_index_and_type() {
    UrlTester::post("/devs/developer/1/_explain?routing=r1")
        .fluent(|c| async move {
            c.explain(
                ExplainDescriptor::of::<Developer>(1i64)
                    .index("devs")
                    .routing("r1")
                    .query(|q| q.match_all(|m| m)),
            )
            .await
        })
        .await;
}

#[tokio::test]
async fn test_multi_term_vectors() {
    UrlTester::post("/_mtermvectors")
        .fluent(|c| async move { c.multi_term_vectors(MultiTermVectorsDescriptor::new()).await })
        .await
        .initializer(|c| async move { c.multi_term_vectors(MultiTermVectorsRequest::new()).await })
        .await;

    UrlTester::post("/project/_mtermvectors")
        .fluent(|c| async move {
            c.multi_term_vectors(MultiTermVectorsDescriptor::new().index("project"))
                .await
        })
        .await
        .initializer(|c| async move { c.multi_term_vectors(MultiTermVectorsRequest::on("project")).await })
        .await;

    UrlTester::post("/project/commits/_mtermvectors")
        .fluent(|c| async move {
            c.multi_term_vectors(
                MultiTermVectorsDescriptor::new()
                    .index(elastik::IndexName::of::<CommitActivity>())
                    .doc_type(elastik::TypeName::of::<CommitActivity>()),
            )
            .await
        })
        .await
        .initializer(|c| async move {
            c.multi_term_vectors(MultiTermVectorsRequest::on_type("project", "commits"))
                .await
        })
        .await;
}

#[tokio::test]
async fn test_index_templates() {
    UrlTester::get("/_template")
        .fluent(|c| async move { c.get_index_template(GetIndexTemplateDescriptor::new()).await })
        .await
        .initializer(|c| async move { c.get_index_template(GetIndexTemplateRequest::new()).await })
        .await;

    UrlTester::get("/_template/nestx?local=true")
        .fluent(|c| async move {
            c.get_index_template(GetIndexTemplateDescriptor::new().name("nestx").local(true))
                .await
        })
        .await
        .initializer(|c| async move {
            let mut request = GetIndexTemplateRequest::named("nestx");
            request.params.set("local", true);
            c.get_index_template(request).await
        })
        .await;

    UrlTester::put("/_template/nestx")
        .fluent(|c| async move {
            c.put_index_template(PutIndexTemplateDescriptor::new("nestx").index_patterns(["nestx-*"]))
                .await
        })
        .await
        .initializer(|c| async move {
            let mut request = PutIndexTemplateRequest::new("nestx");
            request.index_patterns = vec!["nestx-*".to_string()];
            c.put_index_template(request).await
        })
        .await;

    UrlTester::delete("/_template/nestx")
        .initializer(|c| async move { c.delete_index_template(DeleteIndexTemplateRequest::new("nestx")).await })
        .await;
}

#[tokio::test]
async fn test_documents() {
    UrlTester::get("/project/project/NEST")
        .fluent(|c| async move { c.get_document::<Project>(GetDocumentDescriptor::new("NEST")).await })
        .await
        .initializer(|c| async move { c.get_document(GetDocumentRequest::<Project>::of("NEST")).await })
        .await;

    UrlTester::put("/project/project/NEST")
        .fluent(|c| async move { c.index(Project::instance()).await })
        .await;

    UrlTester::put("/default-index/developer/1?op_type=create")
        .fluent(|c| async move {
            c.index_document(IndexDocumentDescriptor::new(Developer::instance()).op_type("create"))
                .await
        })
        .await;

    UrlTester::delete("/project/commits/commit-1?refresh=true")
        .fluent(|c| async move {
            c.delete_document(DeleteDocumentDescriptor::of::<CommitActivity>("commit-1").refresh(true))
                .await
        })
        .await
        .initializer(|c| async move {
            let mut request = DeleteDocumentRequest::for_document(&CommitActivity::instance());
            request.params.set("refresh", true);
            c.delete_document(request).await
        })
        .await;
}

#[tokio::test]
async fn test_search() {
    UrlTester::post("/project/project/_search")
        .fluent(|c| async move { c.search(SearchDescriptor::<Project>::of()).await })
        .await
        .initializer(|c| async move { c.search(SearchRequest::<Project>::of()).await })
        .await;

    UrlTester::post("/_search")
        .fluent(|c| async move { c.search(SearchDescriptor::<Project>::new().all_indices()).await })
        .await
        .initializer(|c| async move {
            let mut request = SearchRequest::<Project>::on(Indices::All);
            request.query = Some(Query::build(|q| q.match_all(|m| m)));
            c.search(request).await
        })
        .await;

    UrlTester::post("/project,devs/_search?routing=r1")
        .fluent(|c| async move {
            c.search(SearchDescriptor::<Developer>::new().index(["project", "devs"]).routing("r1"))
                .await
        })
        .await;
}

#[tokio::test]
async fn test_cluster_health() {
    UrlTester::get("/_cluster/health")
        .fluent(|c| async move { c.cluster_health(ClusterHealthDescriptor::new()).await })
        .await
        .initializer(|c| async move { c.cluster_health(ClusterHealthRequest::new()).await })
        .await;

    UrlTester::get("/_cluster/health/project?wait_for_status=yellow")
        .fluent(|c| async move {
            c.cluster_health(ClusterHealthDescriptor::new().index("project").wait_for_status("yellow"))
                .await
        })
        .await;
}
