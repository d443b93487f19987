/// Guard that checks held privilege scopes and returns early if none match
///
/// Usage in handler:
/// ```ignore
/// pub async fn delete_client(
///     RequireAuth(auth): RequireAuth,
///     State(state): State<Arc<ClientState>>,
///     Path(client_id): Path<Uuid>,
/// ) -> Result<impl IntoResponse, Problem> {
///     permission_guard!(auth, ROLE_ADMIN);
///
///     // Your handler logic here
/// }
/// ```
#[macro_export]
macro_rules! permission_guard {
    ($auth:expr, $($scope:expr),+ $(,)?) => {
        if !$auth.is_admin() && !($($auth.has_privilege($scope))||+) {
            return Err(marka_core::error_builder::ErrorBuilder::new(
                ::axum::http::StatusCode::FORBIDDEN,
            )
            .type_("https://marka.sh/probs/insufficient-permissions")
            .title("Insufficient Permissions")
            .detail(format!(
                "This operation requires one of the following privileges: {}",
                [$($scope),+].join(", ")
            ))
            .value("required_permission", [$($scope),+].join(", "))
            .value("user_role", $auth.effective_role.to_string())
            .build());
        }
    };
}

/// Same check against an arbitrary scope expression instead of literals
#[macro_export]
macro_rules! permission_check {
    ($auth:expr, $scope:expr) => {
        if !$auth.is_admin() && !$auth.has_privilege(&$scope) {
            return Err(marka_core::error_builder::ErrorBuilder::new(
                ::axum::http::StatusCode::FORBIDDEN,
            )
            .type_("https://marka.sh/probs/insufficient-permissions")
            .title("Insufficient Permissions")
            .detail(format!("This operation requires the {} privilege", $scope))
            .value("required_permission", $scope.to_string())
            .value("user_role", $auth.effective_role.to_string())
            .build());
        }
    };
}
