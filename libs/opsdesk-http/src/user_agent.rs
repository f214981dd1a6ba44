use crate::error::HttpError;
use http::{HeaderValue, Request, Response};
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower layer that sets a default `User-Agent` header.
#[derive(Clone)]
pub struct UserAgentLayer {
    user_agent: HeaderValue,
}

impl UserAgentLayer {
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if the string is not a valid header value
    pub fn try_new(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        let user_agent =
            HeaderValue::from_str(user_agent.as_ref()).map_err(HttpError::InvalidHeaderValue)?;
        Ok(Self { user_agent })
    }
}

impl<S> Layer<S> for UserAgentLayer {
    type Service = UserAgentService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        UserAgentService {
            inner,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Created by [`UserAgentLayer`].
#[derive(Clone)]
pub struct UserAgentService<S> {
    inner: S,
    user_agent: HeaderValue,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for UserAgentService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // A caller-provided value wins.
        if !req.headers().contains_key(http::header::USER_AGENT) {
            req.headers_mut()
                .insert(http::header::USER_AGENT, self.user_agent.clone());
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::future::{Ready, ready};
    use tower::ServiceExt;

    /// Echoes the request's User-Agent back in the response body.
    #[derive(Clone)]
    struct EchoUa;

    impl Service<Request<()>> for EchoUa {
        type Response = Response<String>;
        type Error = Infallible;
        type Future = Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<()>) -> Self::Future {
            let ua = req
                .headers()
                .get(http::header::USER_AGENT)
                .map(|v| v.to_str().unwrap().to_owned())
                .unwrap_or_default();
            ready(Ok(Response::new(ua)))
        }
    }

    #[tokio::test]
    async fn sets_default_user_agent() {
        let svc = UserAgentLayer::try_new("opsdesk/test").unwrap().layer(EchoUa);
        let resp = svc.oneshot(Request::new(())).await.unwrap();
        assert_eq!(resp.body(), "opsdesk/test");
    }

    #[tokio::test]
    async fn keeps_caller_user_agent() {
        let svc = UserAgentLayer::try_new("opsdesk/test").unwrap().layer(EchoUa);
        let req = Request::builder()
            .header(http::header::USER_AGENT, "custom/2.0")
            .body(())
            .unwrap();
        let resp = svc.oneshot(req).await.unwrap();
        assert_eq!(resp.body(), "custom/2.0");
    }

    #[test]
    fn rejects_invalid_header_value() {
        assert!(matches!(
            UserAgentLayer::try_new("bad\nagent"),
            Err(HttpError::InvalidHeaderValue(_))
        ));
    }
}
