// handlers/mod.rs - HTTP handlers grouped by security tier
//
// public/    - no token required (registration, login)
// protected/ - bearer token required; the `require_caller` middleware has
//              already resolved the token into a `Caller` extension
//
// Handlers stay thin: extract, call one service method, wrap the result in
// the response envelope. Ownership checks live in the services.

pub mod extract;
pub mod protected;
pub mod public;

/*
ROUTE TABLE (relative to the configured API prefix, default /talearc/api):

Public:
    POST   /auth/register
    POST   /auth/login

Protected:
    GET    /auth/userinfo
    POST   /auth/logout
    GET    /worldviews                     ?page&size
    POST   /worldviews
    GET    /worldviews/:id
    PUT    /worldviews/:id
    DELETE /worldviews/:id                 cascades to everything beneath it
    GET    /characters                     ?page&size&worldViewId
    ...    /characters/:id
    GET    /character-snapshots            ?page&size&worldViewId&characterId
    ...    /character-snapshots/:id
    GET    /miscs                          ?page&size&worldViewId
    ...    /miscs/:id
    GET    /world-events                   ?page&size&worldViewId
    GET    /world-events/list/:worldViewId unpaginated timeline
    ...    /world-events/:id
    GET    /novels                         ?page&size&worldViewId
    ...    /novels/:id
    GET    /novels/:novelId/chapters       table of contents, no bodies
    POST   /novels/:novelId/chapters
    ...    /novels/:novelId/chapters/:id   detail carries `content`

Unprefixed:
    GET    /        name and version
    GET    /health  store ping, 503 when unreachable

Creates answer 201; deletes answer 200 with `data: null`.
*/
