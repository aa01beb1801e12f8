//! Civo error codes
//!
//! Civo error bodies carry a symbolic `code`. The table below lists every code
//! the API is known to return; codes missing from it resolve to `Unknown`.

use nimbus_core::ErrorKind;

/// Kind for a Civo error code, `None` for codes not in the table
pub fn resolve_code(code: &str) -> Option<ErrorKind> {
    let kind = match code {
        "region_unavailable" => ErrorKind::RegionUnavailable,
        "quota_limit_reached" => ErrorKind::QuotaLimitReached,
        "disabled_service"
        | "account_not_enabled_inc_card"
        | "account_not_enabled_without_card" => ErrorKind::DisabledService,
        "authentication_failed"
        | "database_account_access_denied"
        | "database_user_login_failed"
        | "authentication_invalid_key"
        | "authentication_access_denied" => ErrorKind::Unauthorized,
        "database_account_not_found"
        | "database_api_key_not_found"
        | "database_blueprint_not_found"
        | "database_dns_domain_not_found"
        | "database_dns_record_not_found"
        | "database_firewall_not_found"
        | "database_loadbalancer_not_found"
        | "database_memberships_not_found"
        | "database_network_not_found"
        | "database_quota_not_found"
        | "database_service_not_found"
        | "database_size_not_found"
        | "database_snapshot_create_instance_not_found"
        | "database_snapshot_not_found"
        | "database_ssh_key_not_found"
        | "database_team_not_found"
        | "database_template_not_found"
        | "database_user_not_found"
        | "database_volume_not_found"
        | "database_webhook_not_found"
        | "database_kubernetes_application_not_found"
        | "database_kubernetes_cluster_not_found"
        | "database_kubernetes_node_not_found"
        | "database_cluster_pool_not_found"
        | "database_cluster_pool_instance_not_found"
        | "database_instance_find"
        | "database_namespace_not_found"
        | "database_disk_image_not_found" => ErrorKind::NotFound,
        "cannot_scale_already_rescaling_cluster"
        | "database_api_key_duplicate"
        | "database_dns_domain_duplicate_name"
        | "database_firewall_duplicate_name"
        | "database_loadbalancer_exists"
        | "database_loadbalancer_duplicate_name"
        | "database_network_exists"
        | "database_network_duplicate_name"
        | "database_snapshot_create_already_in_process"
        | "database_ssh_key_duplicate_name"
        | "database_template_would_conflict"
        | "database_user_already_exists"
        | "database_volume_duplicate_name"
        | "database_webhook_would_conflict"
        | "firewall_duplicate"
        | "sshkey_duplicate"
        | "database_kubernetes_cluster_duplicate"
        | "database_instance_already_in_rescue_state"
        | "instance_duplicate"
        | "database_instance_duplicate_name"
        | "database_firewall_exists"
        | "database_namespace_exists"
        | "database_namespace_duplicate_name"
        | "database_template_exists" => ErrorKind::Conflict,
        "database_kubernetes_cluster_invalid"
        | "parameter_empty_volume_id"
        | "parameter_empty_openstack_volume_id"
        | "database_firewall_rules_invalid_params"
        | "database_memberships_invalid_invitation"
        | "database_memberships_invalid_status"
        | "database_image_id_invalid"
        | "database_volume_id_invalid"
        | "database_user_password_invalid"
        | "parameter_time_value"
        | "parameter_date_range_too_long"
        | "parameter_dns_record_type"
        | "parameter_dns_record_cname_apex"
        | "parameter_public_key_empty"
        | "parameter_date_range"
        | "parameter_id_missing"
        | "parameter_id_to_integer"
        | "parameter_image_and_volume_id_missing"
        | "parameter_label_invalid"
        | "parameter_name_invalid"
        | "parameter_private_ip_missing"
        | "parameter_public_ip_missing"
        | "parameter_size_missing"
        | "parameter_volume_size_incorrect"
        | "parameter_volume_size_must_increase"
        | "parameter_snapshot_missing"
        | "parameter_snapshot_incorrect_format"
        | "parameter_start_port_missing"
        | "parameter_value_missing"
        | "volume_invalid_size"
        | "database_kubernetes_application_invalid_plan"
        | "database_dns_domain_invalid"
        | "database_kubernetes_cluster_invalid_version"
        | "kubernetes_cluster_invalid_name" => ErrorKind::ValidationFailed,
        "civostatsd_record_failed"
        | "database_account_destroy"
        | "database_creating_account"
        | "database_updating_account"
        | "database_account_stats"
        | "database_action_listing"
        | "database_action_create"
        | "database_api_key_create"
        | "database_api_key_destroy"
        | "database_audit_log_listing"
        | "database_blueprint_delete_failed"
        | "database_blueprint_create"
        | "database_blueprint_update"
        | "database_change_api_key"
        | "database_charge_listing"
        | "database_connection_failed"
        | "database_dns_domain_create"
        | "database_dns_domain_update"
        | "database_dns_record_create"
        | "database_dns_record_update"
        | "database_firewall_create"
        | "database_firewall_mismatch"
        | "database_firewall_save_failed"
        | "database_firewall_delete_failed"
        | "database_firewall_rule_create"
        | "database_firewall_rule_delete_failed"
        | "database_firewall_rules_find"
        | "database_cannot_manage_cluster_instance"
        | "database_old_instance_find"
        | "database_cannot_move_ip"
        | "database_ip_find"
        | "database_listing_accounts"
        | "database_listing_firewalls"
        | "database_listing_dns_domains"
        | "database_listing_memberships"
        | "database_loadbalancer_save_failed"
        | "database_loadbalancer_deleted_failed"
        | "database_loadbalancer_update_failed"
        | "database_membership_cannot_delete"
        | "database_memberships_grant_access"
        | "database_memberships_suspended"
        | "database_networks_list"
        | "database_network_create"
        | "database_network_delete_last"
        | "database_network_delete_with_instance"
        | "database_network_lookup"
        | "database_network_save"
        | "database_private_ip_from_public_ip"
        | "database_quota_update"
        | "database_sizes_list"
        | "database_snapshot_cannot_delete_in_use"
        | "database_snapshot_cannot_replace"
        | "database_snapshot_create"
        | "database_snapshots_list"
        | "database_ssh_key_destroy"
        | "database_ssh_key_create"
        | "database_ssh_key_update"
        | "database_team_cannot_delete"
        | "database_team_create"
        | "database_team_listing"
        | "database_team_membership_create"
        | "database_template_destroy"
        | "database_template_update"
        | "database_user_new"
        | "database_user_confirmed"
        | "database_user_suspended"
        | "database_user_no_change_status"
        | "database_user_password_securing_failed"
        | "database_user_update"
        | "database_creating_user"
        | "database_volume_cannot_multiple_attach"
        | "database_volume_still_attached_cannot_resize"
        | "database_volume_not_attached"
        | "database_volume_delete_failed"
        | "database_webhook_destroy"
        | "database_webhook_update"
        | "openstack_connection_failed"
        | "openstack_creating_project"
        | "openstack_creating_user"
        | "openstack_firewall_create"
        | "openstack_firewall_destroy"
        | "openstack_firewall_rule_destroy"
        | "openstack_instance_create"
        | "openstack_instance_destroy"
        | "openstack_instance_find"
        | "openstack_instance_reboot"
        | "openstack_instance_rebuild"
        | "openstack_instance_resize"
        | "openstack_instance_restore"
        | "openstack_instance_set_firewall"
        | "openstack_instance_start"
        | "openstack_instance_stop"
        | "openstack_ip_create"
        | "openstack_network_create_failed"
        | "openstack_network_destroy_failed"
        | "openstack_network_ensure_configured"
        | "openstack_public_ip_connect"
        | "openstack_quota_apply"
        | "openstack_snapshot_destroy"
        | "openstack_ssh_key_upload"
        | "openstack_project_destroy"
        | "openstack_project_find"
        | "openstack_user_destroy"
        | "openstack_url_glance"
        | "openstack_url_nova"
        | "marshaling_objects_to_json"
        | "database_template_parse_request"
        | "database_cluster_pool_instance_delete_failed"
        | "database_cluster_pool_no_sufficient_instances_available"
        | "database_instance_build"
        | "database_instance_build_multiple_with_existing_public_ip"
        | "database_instance_create"
        | "database_instance_snapshot_too_big"
        | "database_instance_list"
        | "database_instance_not_in_openstack"
        | "database_kubernetes_cluster_no_pools"
        | "database_namespaces_list"
        | "database_namespace_create"
        | "database_namespace_delete_last"
        | "database_namespace_delete_with_instance"
        | "database_namespace_lookup"
        | "database_namespace_save"
        | "database_quota_lock_failed"
        | "database_disk_image_not_implemented"
        | "database_template_save_failed" => ErrorKind::Internal,
        // recognised codes without a more specific kind
        "cannot_rescue_new_volume"
        | "cannot_restore_new_volume"
        | "instance_state_must_be_active_or_shutoff"
        | "network_create_default"
        | "network_delete_default"
        | "cannot_resize_volume"
        | "out_of_capacity"
        | "cannot_get_console" => ErrorKind::Unknown,
        _ => return None,
    };
    Some(kind)
}
