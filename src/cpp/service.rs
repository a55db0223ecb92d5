//! Generic service generation: an abstract base class, an index-keyed
//! `CallMethod` dispatch, and client stubs (callback and blocking) over the
//! `RpcChannel` seam. The runtime supplies the channel implementations.

use crate::descriptor::{MethodDescriptor, ServiceDescriptor};
use crate::options::Options;
use crate::printer::Printer;
use crate::proto::Semantic;

use super::names;

pub struct ServiceGenerator<'a> {
    service: ServiceDescriptor<'a>,
    options: &'a Options,
    classname: String,
}

impl<'a> ServiceGenerator<'a> {
    pub fn new(service: ServiceDescriptor<'a>, options: &'a Options) -> Self {
        ServiceGenerator {
            service,
            options,
            classname: names::service_class_name(service),
        }
    }

    fn method_vars(&self, method: MethodDescriptor<'a>) -> Vec<(String, String)> {
        vec![
            ("method".to_string(), method.name().to_string()),
            (
                "request".to_string(),
                names::qualified_class_name(method.input_type()),
            ),
            (
                "response".to_string(),
                names::qualified_class_name(method.output_type()),
            ),
            ("index".to_string(), method.index().to_string()),
        ]
    }

    fn with_service_vars<F: FnOnce(&mut Printer)>(&self, p: &mut Printer, body: F) {
        let method_count = self.service.method_count().to_string();
        p.with_vars(
            &[
                ("classname", &self.classname),
                ("full_name", self.service.full_name()),
                ("dllexport", &self.options.dllexport_decl),
                ("method_count", &method_count),
            ],
            body,
        );
    }

    /// Header-side declarations: base class and both stubs.
    pub fn generate_declarations(&self, p: &mut Printer) {
        self.with_service_vars(p, |p| {
            p.print(
                "class$ dllexport$ $classname$ {\n\
                 \x20public:\n",
            );
            if self.options.annotate_code {
                p.annotate(
                    "classname",
                    self.service.file().name(),
                    self.service.path(),
                    Semantic::None,
                );
            }
            p.indent();
            p.print(
                "$classname$() = default;\n\
                 virtual ~$classname$();\n\
                 $classname$(const $classname$&) = delete;\n\
                 $classname$& operator=(const $classname$&) = delete;\n\
                 \n\
                 static constexpr const char* kFullName = \"$full_name$\";\n\
                 static constexpr int kMethodCount = $method_count$;\n\
                 \n",
            );
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "virtual void $method$(::google::protobuf::RpcController* controller,\n\
                     \x20                  const $request$* request,\n\
                     \x20                  $response$* response,\n\
                     \x20                  ::google::protobuf::Closure* done);\n",
                );
            }
            p.print(
                "\n\
                 // Dispatch keyed on the method's declaration index.\n\
                 void CallMethod(int method_index,\n\
                 \x20              ::google::protobuf::RpcController* controller,\n\
                 \x20              const ::google::protobuf::Message* request,\n\
                 \x20              ::google::protobuf::Message* response,\n\
                 \x20              ::google::protobuf::Closure* done);\n",
            );
            p.outdent();
            p.print(
                "};\n\
                 \n\
                 class$ dllexport$ $classname$_Stub final : public $classname$ {\n\
                 \x20public:\n",
            );
            p.indent();
            p.print(
                "explicit $classname$_Stub(::google::protobuf::RpcChannel* channel);\n\
                 ::google::protobuf::RpcChannel* channel() { return channel_; }\n\
                 \n",
            );
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "void $method$(::google::protobuf::RpcController* controller,\n\
                     \x20          const $request$* request,\n\
                     \x20          $response$* response,\n\
                     \x20          ::google::protobuf::Closure* done) override;\n",
                );
            }
            p.outdent();
            p.print(
                "\x20private:\n\
                 \x20 ::google::protobuf::RpcChannel* channel_;\n\
                 };\n\
                 \n\
                 class$ dllexport$ $classname$_BlockingStub final {\n\
                 \x20public:\n",
            );
            p.indent();
            p.print(
                "explicit $classname$_BlockingStub(::google::protobuf::BlockingRpcChannel* channel);\n\
                 \n",
            );
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "bool $method$(::google::protobuf::RpcController* controller,\n\
                     \x20          const $request$& request,\n\
                     \x20          $response$* response);\n",
                );
            }
            p.outdent();
            p.print(
                "\x20private:\n\
                 \x20 ::google::protobuf::BlockingRpcChannel* channel_;\n\
                 };\n",
            );
        });
    }

    /// Source-side bodies.
    pub fn generate_methods(&self, p: &mut Printer) {
        self.with_service_vars(p, |p| {
            p.print("$classname$::~$classname$() {}\n");
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "void $classname$::$method$(::google::protobuf::RpcController* controller,\n\
                     \x20   const $request$*, $response$*, ::google::protobuf::Closure* done) {\n\
                     \x20 controller->SetFailed(\"Method $method$() not implemented.\");\n\
                     \x20 done->Run();\n\
                     }\n",
                );
            }
            p.print(
                "void $classname$::CallMethod(int method_index,\n\
                 \x20   ::google::protobuf::RpcController* controller,\n\
                 \x20   const ::google::protobuf::Message* request,\n\
                 \x20   ::google::protobuf::Message* response,\n\
                 \x20   ::google::protobuf::Closure* done) {\n\
                 \x20 switch (method_index) {\n",
            );
            p.indent();
            p.indent();
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "case $index$:\n\
                     \x20 $method$(controller,\n\
                     \x20          static_cast<const $request$*>(request),\n\
                     \x20          static_cast<$response$*>(response), done);\n\
                     \x20 break;\n",
                );
            }
            p.print(
                "default:\n\
                 \x20 controller->SetFailed(\"Bad method index.\");\n\
                 \x20 done->Run();\n\
                 \x20 break;\n",
            );
            p.outdent();
            p.outdent();
            p.print(
                "\x20 }\n\
                 }\n\
                 \n\
                 $classname$_Stub::$classname$_Stub(::google::protobuf::RpcChannel* channel)\n\
                 \x20   : channel_(channel) {}\n",
            );
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "void $classname$_Stub::$method$(::google::protobuf::RpcController* controller,\n\
                     \x20   const $request$* request, $response$* response,\n\
                     \x20   ::google::protobuf::Closure* done) {\n\
                     \x20 channel_->CallMethod($index$, controller, request, response, done);\n\
                     }\n",
                );
            }
            p.print(
                "$classname$_BlockingStub::$classname$_BlockingStub(::google::protobuf::BlockingRpcChannel* channel)\n\
                 \x20   : channel_(channel) {}\n",
            );
            for method in self.service.methods() {
                let vars = self.method_vars(method);
                let view: Vec<(&str, &str)> =
                    vars.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                p.print_with(
                    &view,
                    "bool $classname$_BlockingStub::$method$(::google::protobuf::RpcController* controller,\n\
                     \x20   const $request$& request, $response$* response) {\n\
                     \x20 return channel_->CallBlockingMethod($index$, controller, &request, response);\n\
                     }\n",
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorPool;
    use crate::proto::*;

    fn pool() -> DescriptorPool {
        let file = FileDescriptorProto {
            name: "echo.proto".to_string(),
            package: "rpc".to_string(),
            syntax: "proto3".to_string(),
            message_type: vec![
                DescriptorProto {
                    name: "Ping".to_string(),
                    ..Default::default()
                },
                DescriptorProto {
                    name: "Pong".to_string(),
                    ..Default::default()
                },
            ],
            service: vec![ServiceDescriptorProto {
                name: "Echo".to_string(),
                method: vec![
                    MethodDescriptorProto {
                        name: "Send".to_string(),
                        input_type: ".rpc.Ping".to_string(),
                        output_type: ".rpc.Pong".to_string(),
                        ..Default::default()
                    },
                    MethodDescriptorProto {
                        name: "Flush".to_string(),
                        input_type: ".rpc.Ping".to_string(),
                        output_type: ".rpc.Pong".to_string(),
                        ..Default::default()
                    },
                ],
            }],
            ..Default::default()
        };
        let mut pool = DescriptorPool::new();
        pool.add_file(&file).unwrap();
        pool
    }

    #[test]
    fn dispatch_is_keyed_on_method_index() {
        let pool = pool();
        let service = pool
            .file_by_name("echo.proto")
            .unwrap()
            .services()
            .next()
            .unwrap();
        let options = Options::default();
        let generator = ServiceGenerator::new(service, &options);
        let mut source = Printer::new();
        generator.generate_methods(&mut source);
        let text = source.into_parts().0;
        assert!(text.contains("case 0:"));
        assert!(text.contains("case 1:"));
        assert!(text.contains("channel_->CallMethod(0, controller, request, response, done);"));
        assert!(text.contains("CallBlockingMethod(1, controller, &request, response);"));
    }

    #[test]
    fn header_declares_base_and_both_stubs() {
        let pool = pool();
        let service = pool
            .file_by_name("echo.proto")
            .unwrap()
            .services()
            .next()
            .unwrap();
        let options = Options::default();
        let generator = ServiceGenerator::new(service, &options);
        let mut header = Printer::new();
        generator.generate_declarations(&mut header);
        let text = header.into_parts().0;
        assert!(text.contains("class Echo {"));
        assert!(text.contains("class Echo_Stub final : public Echo {"));
        assert!(text.contains("class Echo_BlockingStub final {"));
        assert!(text.contains("static constexpr int kMethodCount = 2;"));
        assert!(text.contains("virtual void Send(::google::protobuf::RpcController* controller,"));
    }
}
