//! 用户与订单服务，二者互相依赖

use component_macros::Component;
use di_abstractions::Autowired;
use infrastructure_common::{string_arg, Invocable, InvocationError, OperationSignature, Value};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// 用户服务
#[derive(Default, Component)]
#[component(invocable, register, destroy = "shutdown")]
pub struct UserService {
    #[autowired]
    order_service: Autowired<dyn Invocable>,
    users: Mutex<Vec<String>>,
}

impl UserService {
    fn shutdown(&self) -> Result<(), InvocationError> {
        info!("UserService 关闭, 用户 {} 个", self.users.lock().len());
        Ok(())
    }

    fn order_service(&self, operation: &str) -> Result<&dyn Invocable, InvocationError> {
        self.order_service
            .get()
            .map(|service| service.as_ref())
            .ok_or_else(|| InvocationError::failed(operation, "orderService 未注入"))
    }
}

impl Invocable for UserService {
    fn operations(&self) -> Vec<OperationSignature> {
        vec![
            OperationSignature::of::<Self>("createUser")
                .returns("String")
                .param("String"),
            OperationSignature::of::<Self>("deleteUser").param("String"),
            OperationSignature::of::<Self>("hasUser")
                .returns("boolean")
                .param("String"),
        ]
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
        match operation {
            "createUser" => {
                let user = string_arg(operation, args, 0)?;
                {
                    let mut users = self.users.lock();
                    if users.iter().any(|existing| existing == user) {
                        return Err(InvocationError::failed(operation, format!("用户已存在: {}", user)));
                    }
                    users.push(user.to_string());
                }
                info!("创建用户: {}", user);
                self.order_service(operation)?.invoke("createOrder", args)
            }
            "deleteUser" => {
                let user = string_arg(operation, args, 0)?;
                let mut users = self.users.lock();
                let before = users.len();
                users.retain(|existing| existing != user);
                if users.len() == before {
                    return Err(InvocationError::failed(operation, format!("用户不存在: {}", user)));
                }
                info!("删除用户: {}", user);
                Ok(Value::Null)
            }
            "hasUser" => {
                let user = string_arg(operation, args, 0)?;
                Ok(Value::Bool(self.users.lock().iter().any(|existing| existing == user)))
            }
            _ => Err(InvocationError::unknown_operation("UserService", operation)),
        }
    }
}

/// 订单服务
#[derive(Default, Component)]
#[component(name = "orderService", invocable, register)]
pub struct OrderServiceImpl {
    #[autowired]
    user_service: Autowired<dyn Invocable>,
    next_id: AtomicUsize,
}

impl Invocable for OrderServiceImpl {
    fn operations(&self) -> Vec<OperationSignature> {
        vec![OperationSignature::of::<Self>("createOrder")
            .returns("String")
            .param("String")]
    }

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Value, InvocationError> {
        match operation {
            "createOrder" => {
                let user = string_arg(operation, args, 0)?;
                let users = self
                    .user_service
                    .get()
                    .ok_or_else(|| InvocationError::failed(operation, "userService 未注入"))?;
                if users.invoke("hasUser", args)? != Value::Bool(true) {
                    return Err(InvocationError::failed(operation, format!("未知用户: {}", user)));
                }

                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                let order = format!("order-{}-{}", id, user);
                info!("创建订单: {}", order);
                Ok(Value::from(order))
            }
            _ => Err(InvocationError::unknown_operation("OrderServiceImpl", operation)),
        }
    }
}
