//! Validation rules for Route objects

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use portcullis_core::validation::{
    is_dns1123_subdomain, validate_object_meta, validate_object_meta_update,
};
use portcullis_core::{ErrorList, FieldError, Path};

use crate::api::{
    InsecureEdgeTerminationPolicy, Route, RouteTargetReference, TlsConfig, TlsTermination,
    WildcardPolicy,
};

/// Highest weight a backend may carry
pub const MAX_BACKEND_WEIGHT: i32 = 256;

/// Most alternate backends a route may list
pub const MAX_ALTERNATE_BACKENDS: usize = 3;

/// Validate a Route about to be created
pub fn validate_route(route: &Route) -> ErrorList {
    let mut errs = validate_object_meta(&route.metadata, true, &Path::new("metadata"));
    let spec = Path::new("spec");

    let host = route.spec.host.as_str();
    if !host.is_empty() {
        for problem in is_dns1123_subdomain(host) {
            errs.push(FieldError::invalid(spec.child("host"), host, problem));
        }
    } else if route.spec.wildcard_policy == WildcardPolicy::Subdomain {
        errs.push(FieldError::required(
            spec.child("host"),
            "host name is required when wildcard policy is Subdomain",
        ));
    }

    let path = route.spec.path.as_str();
    if !path.is_empty() && !path.starts_with('/') {
        errs.push(FieldError::invalid(
            spec.child("path"),
            path,
            "path must begin with /",
        ));
    }

    errs.extend(validate_backend(&route.spec.to, &spec.child("to")));

    let alternates = &route.spec.alternate_backends;
    if alternates.len() > MAX_ALTERNATE_BACKENDS {
        errs.push(FieldError::too_many(
            spec.child("alternateBackends"),
            alternates.len(),
            MAX_ALTERNATE_BACKENDS,
        ));
    }
    for (i, backend) in alternates.iter().enumerate() {
        errs.extend(validate_backend(backend, &spec.child("alternateBackends").index(i)));
    }

    if let Some(port) = &route.spec.port {
        let target = spec.child("port").child("targetPort");
        match &port.target_port {
            IntOrString::Int(0) => errs.push(FieldError::required(target, "")),
            IntOrString::String(s) if s.is_empty() => {
                errs.push(FieldError::required(target, ""))
            }
            _ => {}
        }
    }

    if let Some(tls) = &route.spec.tls {
        errs.extend(validate_tls(route, tls, &spec.child("tls")));
    }

    errs
}

/// Validate an update of a Route against its stored form
///
/// Once a host is set it may not change.
pub fn validate_route_update(route: &Route, old: &Route) -> ErrorList {
    let mut errs = validate_object_meta_update(
        &route.metadata,
        &old.metadata,
        &Path::new("metadata"),
    );
    if !old.spec.host.is_empty() && route.spec.host != old.spec.host {
        errs.push(FieldError::invalid(
            Path::new("spec").child("host"),
            route.spec.host.as_str(),
            "field is immutable",
        ));
    }
    errs.extend(validate_route(route));
    errs
}

/// Validate a status-only update of a Route
pub fn validate_route_status_update(route: &Route, old: &Route) -> ErrorList {
    let mut errs = validate_object_meta_update(
        &route.metadata,
        &old.metadata,
        &Path::new("metadata"),
    );

    let ingress_path = Path::new("status").child("ingress");
    for (i, ingress) in route.status.ingress.iter().enumerate() {
        let path = ingress_path.index(i);
        if ingress.router_name.is_empty() {
            errs.push(FieldError::required(path.child("routerName"), ""));
        }
        if !ingress.host.is_empty() {
            for problem in is_dns1123_subdomain(&ingress.host) {
                errs.push(FieldError::invalid(path.child("host"), ingress.host.as_str(), problem));
            }
        }
    }

    errs
}

fn validate_backend(backend: &RouteTargetReference, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    if backend.kind != "Service" {
        errs.push(FieldError::not_supported(
            path.child("kind"),
            backend.kind.as_str(),
            &["Service"],
        ));
    }
    if backend.name.is_empty() {
        errs.push(FieldError::required(path.child("name"), ""));
    }
    if let Some(weight) = backend.weight {
        if !(0..=MAX_BACKEND_WEIGHT).contains(&weight) {
            errs.push(FieldError::invalid(
                path.child("weight"),
                weight,
                format!("weight must be an integer between 0 and {MAX_BACKEND_WEIGHT}"),
            ));
        }
    }
    errs
}

fn validate_tls(route: &Route, tls: &TlsConfig, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    match tls.termination {
        TlsTermination::Passthrough => {
            if !route.spec.path.is_empty() {
                errs.push(FieldError::invalid(
                    Path::new("spec").child("path"),
                    route.spec.path.as_str(),
                    "passthrough termination does not support paths",
                ));
            }
            for (field, value) in [
                ("certificate", &tls.certificate),
                ("key", &tls.key),
                ("caCertificate", &tls.ca_certificate),
                ("destinationCACertificate", &tls.destination_ca_certificate),
            ] {
                if value.as_deref().is_some_and(|v| !v.is_empty()) {
                    errs.push(FieldError::invalid(
                        path.child(field),
                        "redacted",
                        "passthrough termination does not support certificates",
                    ));
                }
            }
            if tls.insecure_edge_termination_policy == Some(InsecureEdgeTerminationPolicy::Allow) {
                errs.push(FieldError::invalid(
                    path.child("insecureEdgeTerminationPolicy"),
                    "Allow",
                    "Allow is not supported for passthrough termination",
                ));
            }
        }
        TlsTermination::Edge => {
            if tls
                .destination_ca_certificate
                .as_deref()
                .is_some_and(|v| !v.is_empty())
            {
                errs.push(FieldError::invalid(
                    path.child("destinationCACertificate"),
                    "redacted",
                    "edge termination does not support destination certificates",
                ));
            }
        }
        TlsTermination::Reencrypt => {}
    }

    errs
}
